//! Active link / active sphere state machine

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::spheres::{SphereId, SphereStore};
use crate::types::LinkIndex;

/// Current selection. An active sphere always belongs to the active link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    Idle,
    LinkActive {
        link: LinkIndex,
    },
    SphereActive {
        link: LinkIndex,
        sphere: SphereId,
    },
}

impl Selection {
    pub fn active_link(&self) -> Option<LinkIndex> {
        match *self {
            Selection::Idle => None,
            Selection::LinkActive { link } | Selection::SphereActive { link, .. } => Some(link),
        }
    }

    pub fn active_sphere(&self) -> Option<SphereId> {
        match *self {
            Selection::SphereActive { sphere, .. } => Some(sphere),
            _ => None,
        }
    }

    pub fn is_selected(&self, id: SphereId) -> bool {
        self.active_sphere() == Some(id)
    }

    /// Activate a link. The active sphere survives only if `link` owns it.
    pub fn select_link(&mut self, link: &str, store: &SphereStore) -> Result<(), EditError> {
        let link = store.link_index(link)?;
        *self = match self.active_sphere() {
            Some(sphere) if store.owner(sphere) == Some(link) => {
                Selection::SphereActive { link, sphere }
            }
            _ => Selection::LinkActive { link },
        };
        Ok(())
    }

    /// Activate a sphere of the active link
    pub fn select_sphere(&mut self, id: SphereId, store: &SphereStore) -> Result<(), EditError> {
        let owner = store.owner(id).ok_or(EditError::UnknownSphere(id))?;
        match self.active_link() {
            Some(link) if link == owner => {
                *self = Selection::SphereActive { link, sphere: id };
                Ok(())
            }
            _ => Err(EditError::SphereNotOwned { sphere: id }),
        }
    }

    /// Activate a sphere together with its owning link
    pub(crate) fn focus_sphere(&mut self, id: SphereId, store: &SphereStore) -> Result<(), EditError> {
        let link = store.owner(id).ok_or(EditError::UnknownSphere(id))?;
        *self = Selection::SphereActive { link, sphere: id };
        Ok(())
    }

    pub fn deselect(&mut self) {
        *self = Selection::Idle;
    }

    /// Drop references the store no longer backs (after removal, undo, import)
    ///
    /// A sphere that moved to another link keeps its selection and the
    /// active link follows it.
    pub fn reconcile(&mut self, store: &SphereStore) {
        if let Selection::SphereActive { link, sphere } = *self {
            *self = match store.owner(sphere) {
                Some(owner) => Selection::SphereActive {
                    link: owner,
                    sphere,
                },
                None => Selection::LinkActive { link },
            };
        }
        if let Some(link) = self.active_link()
            && link.0 >= store.link_count()
        {
            *self = Selection::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KinematicModel;
    use crate::testing::ARM_URDF;
    use glam::Vec3;

    fn arm_store() -> SphereStore {
        let model = KinematicModel::from_urdf_str(ARM_URDF).unwrap();
        SphereStore::for_model(&model)
    }

    #[test]
    fn test_select_link_then_sphere() {
        let mut store = arm_store();
        let s = store.add("forearm", Vec3::ZERO, 0.1).unwrap();
        let forearm = store.link_index("forearm").unwrap();
        let mut selection = Selection::default();

        selection.select_link("forearm", &store).unwrap();
        assert_eq!(selection, Selection::LinkActive { link: forearm });

        selection.select_sphere(s, &store).unwrap();
        assert_eq!(
            selection,
            Selection::SphereActive {
                link: forearm,
                sphere: s
            }
        );

        selection.deselect();
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn test_select_sphere_of_other_link_rejected() {
        let mut store = arm_store();
        let s = store.add("forearm", Vec3::ZERO, 0.1).unwrap();
        let base = store.link_index("base").unwrap();
        let mut selection = Selection::default();

        selection.select_link("base", &store).unwrap();
        assert_eq!(
            selection.select_sphere(s, &store),
            Err(EditError::SphereNotOwned { sphere: s })
        );
        assert_eq!(selection, Selection::LinkActive { link: base });
    }

    #[test]
    fn test_select_sphere_while_idle_rejected() {
        let mut store = arm_store();
        let s = store.add("forearm", Vec3::ZERO, 0.1).unwrap();
        let mut selection = Selection::default();
        assert!(selection.select_sphere(s, &store).is_err());
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn test_select_link_clears_foreign_sphere() {
        let mut store = arm_store();
        let s = store.add("forearm", Vec3::ZERO, 0.1).unwrap();
        let mut selection = Selection::default();
        selection.focus_sphere(s, &store).unwrap();

        selection.select_link("forearm", &store).unwrap();
        assert_eq!(selection.active_sphere(), Some(s));

        selection.select_link("base", &store).unwrap();
        assert_eq!(selection.active_sphere(), None);
        assert_eq!(selection.active_link(), store.link_index("base").ok());
    }

    #[test]
    fn test_select_unknown_link_keeps_selection() {
        let store = arm_store();
        let mut selection = Selection::default();
        selection.select_link("base", &store).unwrap();
        let before = selection;

        assert_eq!(
            selection.select_link("ghost", &store),
            Err(EditError::UnknownLink("ghost".into()))
        );
        assert_eq!(selection, before);
    }

    #[test]
    fn test_reconcile_after_removal() {
        let mut store = arm_store();
        let s = store.add("forearm", Vec3::ZERO, 0.1).unwrap();
        let mut selection = Selection::default();
        selection.focus_sphere(s, &store).unwrap();

        store.remove(s);
        selection.reconcile(&store);
        assert_eq!(
            selection,
            Selection::LinkActive {
                link: store.link_index("forearm").unwrap()
            }
        );
    }
}
