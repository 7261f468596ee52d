//! ROS package scaffolding: CMakeLists.txt, package.xml and rviz config

use std::path::Path;

use walkdir::WalkDir;

use super::ExportError;

const TEMPLATE_PACKAGE: &str = "template_description";

pub fn generate_cmakelists() -> String {
    format!(
        r#"cmake_minimum_required(VERSION 2.8.3)
project({TEMPLATE_PACKAGE})

find_package(catkin REQUIRED)

catkin_package()

find_package(roslaunch)

foreach(dir config launch meshes urdf)
	install(DIRECTORY ${{dir}}/
		DESTINATION ${{CATKIN_PACKAGE_SHARE_DESTINATION}}/${{dir}})
endforeach(dir)
"#
    )
}

pub fn generate_package_xml() -> String {
    format!(
        r#"<?xml version="1.0"?>
<package format="2">
  <name>{TEMPLATE_PACKAGE}</name>
  <version>0.0.0</version>
  <description>The {TEMPLATE_PACKAGE} package</description>
  <maintainer email="todo@todo.todo">author</maintainer>
  <license>BSD</license>

  <buildtool_depend>catkin</buildtool_depend>
  <depend>rviz</depend>
  <depend>joint_state_publisher_gui</depend>
  <depend>robot_state_publisher</depend>
  <depend>gazebo_ros</depend>
  <depend>gazebo_ros_control</depend>
  <depend>controller_manager</depend>
  <depend>effort_controllers</depend>
  <depend>xacro</depend>
</package>
"#
    )
}

/// Minimal rviz layout showing the robot model and its TF tree
pub fn generate_rviz_config() -> String {
    r#"Panels:
  - Class: rviz/Displays
    Name: Displays
Visualization Manager:
  Class: ""
  Displays:
    - Class: rviz/Grid
      Enabled: true
      Name: Grid
      Plane: XY
      Plane Cell Count: 10
      Reference Frame: <Fixed Frame>
    - Class: rviz/RobotModel
      Enabled: true
      Name: RobotModel
      Robot Description: robot_description
      Visual Enabled: true
    - Class: rviz/TF
      Enabled: true
      Name: TF
      Show Names: true
  Global Options:
    Fixed Frame: base_link
    Frame Rate: 30
  Views:
    Current:
      Class: rviz/Orbit
      Distance: 1.0
      Focal Point:
        X: 0
        Y: 0
        Z: 0
"#
    .to_string()
}

/// Copy every file of a template package over the generated one
///
/// A missing template directory is logged and ignored.
pub fn copy_package(template_dir: &Path, package_dir: &Path) -> Result<(), ExportError> {
    if !template_dir.is_dir() {
        tracing::warn!(
            "Package template directory {:?} does not exist, skipping",
            template_dir
        );
        return Ok(());
    }

    for entry in WalkDir::new(template_dir).into_iter() {
        let entry = entry.map_err(|e| ExportError::Io(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(template_dir)
            .map_err(|e| ExportError::Io(e.to_string()))?;
        let target = package_dir.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            tracing::debug!("Copying {:?} -> {:?}", entry.path(), target);
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Point the `project(...)` line at the package
pub fn update_cmakelists(path: &Path, package_name: &str) -> Result<(), ExportError> {
    rewrite_lines(path, |line| {
        line.trim_start()
            .starts_with("project(")
            .then(|| format!("project({package_name})"))
    })
}

/// Point the `<name>` and `<description>` lines at the package
pub fn update_package_xml(path: &Path, package_name: &str) -> Result<(), ExportError> {
    rewrite_lines(path, |line| {
        if line.contains("<name>") {
            Some(format!("  <name>{package_name}</name>"))
        } else if line.contains("<description>") {
            Some(format!("  <description>The {package_name} package</description>"))
        } else {
            None
        }
    })
}

/// Replace in place every line for which `replace` returns a new line
fn rewrite_lines(
    path: &Path,
    replace: impl Fn(&str) -> Option<String>,
) -> Result<(), ExportError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ExportError::Io(format!("{}: {}", path.display(), e)))?;

    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        match replace(line) {
            Some(new_line) => out.push_str(&new_line),
            None => out.push_str(line),
        }
        out.push('\n');
    }

    std::fs::write(path, out).map_err(|e| ExportError::Io(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_cmakelists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CMakeLists.txt");
        std::fs::write(&path, generate_cmakelists()).unwrap();

        update_cmakelists(&path, "rover_description").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("project(rover_description)\n"));
        assert!(!text.contains(TEMPLATE_PACKAGE));
        assert!(text.contains("${dir}"));
    }

    #[test]
    fn test_update_package_xml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.xml");
        std::fs::write(&path, generate_package_xml()).unwrap();

        update_package_xml(&path, "rover_description").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<name>rover_description</name>"));
        assert!(text.contains("<description>The rover_description package</description>"));
        assert!(!text.contains(TEMPLATE_PACKAGE));
    }

    #[test]
    fn test_update_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = update_cmakelists(&dir.path().join("CMakeLists.txt"), "x");
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[test]
    fn test_copy_package() {
        let template = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(template.path().join("config")).unwrap();
        std::fs::write(template.path().join("config/extra.yaml"), "a: 1\n").unwrap();
        std::fs::write(template.path().join("README.md"), "hi\n").unwrap();

        let package = tempfile::tempdir().unwrap();
        copy_package(template.path(), package.path()).unwrap();

        assert_eq!(
            std::fs::read_to_string(package.path().join("config/extra.yaml")).unwrap(),
            "a: 1\n"
        );
        assert!(package.path().join("README.md").is_file());
    }

    #[test]
    fn test_copy_missing_template_is_ignored() {
        let package = tempfile::tempdir().unwrap();
        let missing = package.path().join("nope");
        assert!(copy_package(&missing, package.path()).is_ok());
    }
}
