//! Robot descriptions shared by unit tests

/// Base plus one arm link on a revolute hinge about Y, range [0, π]
pub(crate) const TWO_LINK_URDF: &str = r#"<?xml version="1.0"?>
<robot name="two_link">
  <link name="base_link"/>
  <link name="arm_link"/>
  <joint name="hinge" type="revolute">
    <parent link="base_link"/>
    <child link="arm_link"/>
    <origin xyz="0 0 0.5" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="0" upper="3.141592653589793" effort="10" velocity="1"/>
  </joint>
</robot>
"#;

/// Small arm covering every supported joint kind, a mimic joint and materials
pub(crate) const ARM_URDF: &str = r#"<?xml version="1.0"?>
<robot name="arm">
  <material name="grey">
    <color rgba="0.5 0.5 0.5 1"/>
  </material>
  <link name="base">
    <visual>
      <geometry><mesh filename="meshes/base.stl"/></geometry>
      <material name="grey"/>
    </visual>
    <collision>
      <geometry><box size="0.2 0.2 0.1"/></geometry>
    </collision>
  </link>
  <link name="upper_arm">
    <visual>
      <origin xyz="0 0 0.2" rpy="0 0 0"/>
      <geometry><cylinder radius="0.05" length="0.4"/></geometry>
    </visual>
  </link>
  <link name="forearm"/>
  <link name="wrist"/>
  <link name="finger_l"/>
  <link name="finger_r"/>
  <link name="tool"/>
  <joint name="shoulder" type="revolute">
    <parent link="base"/>
    <child link="upper_arm"/>
    <origin xyz="0 0 0.1" rpy="0 0 0"/>
    <axis xyz="0 0 1"/>
    <limit lower="-1.5" upper="1.5" effort="10" velocity="1"/>
  </joint>
  <joint name="elbow" type="revolute">
    <parent link="upper_arm"/>
    <child link="forearm"/>
    <origin xyz="0 0 0.4" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="-2" upper="2" effort="10" velocity="1"/>
  </joint>
  <joint name="wrist_roll" type="continuous">
    <parent link="forearm"/>
    <child link="wrist"/>
    <origin xyz="0.3 0 0" rpy="0 0 0"/>
    <axis xyz="1 0 0"/>
  </joint>
  <joint name="finger_left" type="prismatic">
    <parent link="wrist"/>
    <child link="finger_l"/>
    <origin xyz="0.05 0.02 0" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="0" upper="0.04" effort="5" velocity="0.1"/>
  </joint>
  <joint name="finger_right" type="prismatic">
    <parent link="wrist"/>
    <child link="finger_r"/>
    <origin xyz="0.05 -0.02 0" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="-0.04" upper="0" effort="5" velocity="0.1"/>
    <mimic joint="finger_left" multiplier="-1" offset="0"/>
  </joint>
  <joint name="tool_mount" type="fixed">
    <parent link="wrist"/>
    <child link="tool"/>
    <origin xyz="0.1 0 0" rpy="0 1.5707963267948966 0"/>
  </joint>
</robot>
"#;

/// Two links plus elements the kinematic model does not read
pub(crate) const GAZEBO_URDF: &str = r#"<?xml version="1.0"?>
<robot name="driven">
  <link name="base"/>
  <link name="arm">
    <visual>
      <geometry><cylinder radius="0.02" length="0.4"/></geometry>
    </visual>
  </link>
  <joint name="hinge" type="revolute">
    <parent link="base"/>
    <child link="arm"/>
    <origin xyz="0 0 0.1" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="-1" upper="1" effort="10" velocity="1"/>
  </joint>
  <!-- drive train -->
  <transmission name="hinge_trans">
    <type>transmission_interface/SimpleTransmission</type>
    <joint name="hinge">
      <hardwareInterface>hardware_interface/EffortJointInterface</hardwareInterface>
    </joint>
    <actuator name="hinge_motor">
      <mechanicalReduction>1</mechanicalReduction>
    </actuator>
  </transmission>
  <gazebo reference="arm">
    <material>Gazebo/Orange</material>
  </gazebo>
</robot>
"#;
