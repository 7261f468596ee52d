//! ROS launch and controller configuration files

use crate::extract::JointKind;

use super::ExportPlan;

/// Names of the joints that get a position controller
fn controlled_joints(plan: &ExportPlan) -> impl Iterator<Item = &str> {
    plan.joints
        .iter()
        .filter(|(_, joint)| joint.joint_type != JointKind::Fixed)
        .map(|(name, _)| name.as_str())
}

/// `display.launch`: robot state publisher, joint GUI and rviz
pub fn generate_display_launch(robot_name: &str, package_name: &str) -> String {
    format!(
        r#"<launch>
  <arg name="model" default="$(find {package_name})/urdf/{robot_name}.xacro"/>
  <arg name="gui" default="true"/>
  <arg name="rvizconfig" default="$(find {package_name})/launch/urdf.rviz"/>
  <param name="robot_description" command="$(find xacro)/xacro $(arg model)"/>
  <param name="use_gui" value="$(arg gui)"/>
  <node name="joint_state_publisher_gui" pkg="joint_state_publisher_gui" type="joint_state_publisher_gui"/>
  <node name="robot_state_publisher" pkg="robot_state_publisher" type="robot_state_publisher"/>
  <node name="rviz" pkg="rviz" args="-d $(arg rvizconfig)" type="rviz" required="true"/>
</launch>
"#
    )
}

/// `gazebo.launch`: spawn the model into an empty world
pub fn generate_gazebo_launch(robot_name: &str, package_name: &str) -> String {
    format!(
        r#"<launch>
  <param name="robot_description" command="$(find xacro)/xacro $(find {package_name})/urdf/{robot_name}.xacro"/>
  <node name="spawn_urdf" pkg="gazebo_ros" type="spawn_model" args="-param robot_description -urdf -model {robot_name}"/>
  <include file="$(find gazebo_ros)/launch/empty_world.launch">
    <arg name="paused" value="true"/>
    <arg name="use_sim_time" value="true"/>
    <arg name="gui" value="true"/>
    <arg name="headless" value="false"/>
    <arg name="debug" value="false"/>
  </include>
</launch>
"#
    )
}

/// `controller.launch`: load the controller config and start the spawner
pub fn generate_controller_launch(plan: &ExportPlan) -> String {
    let robot = &plan.robot_name;
    let package = &plan.package_name;

    let mut args: Vec<String> = controlled_joints(plan)
        .map(|joint| format!("{joint}_position_controller"))
        .collect();
    args.push("joint_state_controller".to_string());

    format!(
        r#"<launch>

<rosparam file="$(find {package})/launch/controller.yaml" command="load"/>
<node name="controller_spawner" pkg="controller_manager" type="spawner" respawn="false" output="screen" ns="{robot}" args="{args}"/>
<node name="robot_state_publisher" pkg="robot_state_publisher" type="robot_state_publisher" respawn="false" output="screen">
  <remap from="/joint_states" to="/{robot}/joint_states"/>
</node>

</launch>
"#,
        args = args.join(" ")
    )
}

/// `controller.yaml`: joint state publisher plus one PID position
/// controller per moving joint
pub fn generate_controller_yaml(plan: &ExportPlan) -> String {
    let mut yaml = format!(
        "{}_controller:\n  # Publish all joint states\n  joint_state_controller:\n    type: joint_state_controller/JointStateController\n    publish_rate: 50\n\n",
        plan.robot_name
    );

    for joint in controlled_joints(plan) {
        yaml.push_str(&format!("  {joint}_position_controller:\n"));
        yaml.push_str("    type: effort_controllers/JointPositionController\n");
        yaml.push_str(&format!("    joint: {joint}\n"));
        yaml.push_str("    pid: {p: 100.0, i: 0.01, d: 10.0}\n");
    }

    yaml
}
