//! File system tools.

use crate::error::{ToolError, ToolErrorKind, ToolResult};
use chrono::{DateTime, Local};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

pub fn read_file(file_path: &str) -> ToolResult {
    fs::read_to_string(file_path).map_err(|e| ToolError::io("reading file", e))
}

pub fn write_file(file_path: &str, content: &str) -> ToolResult {
    let path = Path::new(file_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ToolError::io("writing file", e))?;
    }
    fs::write(path, content).map_err(|e| ToolError::io("writing file", e))?;
    Ok(format!("Successfully wrote to {}", file_path))
}

pub fn list_directory(dir_path: &str) -> ToolResult {
    let path = Path::new(dir_path);
    check_directory(path, dir_path)?;

    let mut entries: Vec<_> = fs::read_dir(path)
        .map_err(|e| ToolError::io("listing directory", e))?
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| ToolError::io("listing directory", e))?;

    if entries.is_empty() {
        return Ok(format!("Directory '{}' is empty", dir_path));
    }
    entries.sort_by_key(|entry| entry.file_name());

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let item_path = entry.path();
        if item_path.is_dir() {
            dirs.push(format!("[DIR] {}", name));
        } else {
            let size = fs::metadata(&item_path).map(|m| m.len()).unwrap_or(0);
            files.push(format!("[FILE] {} ({} bytes)", name, size));
        }
    }

    let mut result = format!("Contents of '{}':\n\n", dir_path);
    if !dirs.is_empty() {
        result.push_str(&format!("Directories:\n{}\n\n", dirs.join("\n")));
    }
    if !files.is_empty() {
        result.push_str(&format!("Files:\n{}", files.join("\n")));
    }
    Ok(result)
}

pub fn create_directory(dir_path: &str) -> ToolResult {
    fs::create_dir_all(dir_path).map_err(|e| ToolError::io("creating directory", e))?;
    Ok(format!("Successfully created directory '{}'", dir_path))
}

pub fn delete_file_or_path(path: &str) -> ToolResult {
    // symlink_metadata so that a link is removed rather than its target
    let metadata = fs::symlink_metadata(path)
        .map_err(|_| ToolError::not_found(format!("Path '{}' does not exist", path)))?;

    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(|e| ToolError::io("deleting path", e))?;
        Ok(format!("Successfully deleted directory '{}'", path))
    } else {
        fs::remove_file(path).map_err(|e| ToolError::io("deleting path", e))?;
        Ok(format!("Successfully deleted file '{}'", path))
    }
}

pub fn copy_file_or_path(src: &str, dst: &str) -> ToolResult {
    let source = Path::new(src);
    if !source.exists() {
        return Err(ToolError::not_found(format!(
            "Source path '{}' does not exist",
            src
        )));
    }

    if source.is_dir() {
        if Path::new(dst).exists() {
            return Err(ToolError::io(
                "copying",
                format!("destination '{}' already exists", dst),
            ));
        }
        copy_dir_recursive(source, Path::new(dst)).map_err(|e| ToolError::io("copying", e))?;
        Ok(format!(
            "Successfully copied directory from '{}' to '{}'",
            src, dst
        ))
    } else {
        let target = into_directory(source, Path::new(dst));
        fs::copy(source, &target).map_err(|e| ToolError::io("copying", e))?;
        Ok(format!("Successfully copied file from '{}' to '{}'", src, dst))
    }
}

pub fn move_file_or_path(src: &str, dst: &str) -> ToolResult {
    let source = Path::new(src);
    if !source.exists() {
        return Err(ToolError::not_found(format!(
            "Source path '{}' does not exist",
            src
        )));
    }

    let target = into_directory(source, Path::new(dst));
    if fs::rename(source, &target).is_err() {
        // rename cannot cross file systems
        move_by_copy(source, &target).map_err(|e| ToolError::io("moving", e))?;
    }

    Ok(format!("Successfully moved from '{}' to '{}'", src, dst))
}

pub fn get_file_info(file_path: &str) -> ToolResult {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(ToolError::not_found(format!(
            "Path '{}' does not exist",
            file_path
        )));
    }

    let metadata = fs::metadata(path).map_err(|e| ToolError::io("getting file info", e))?;

    let mut info = format!("Information for '{}':\n\n", file_path);
    info.push_str(&format!(
        "Type: {}\n",
        if metadata.is_dir() { "Directory" } else { "File" }
    ));
    info.push_str(&format!("Size: {} bytes\n", metadata.len()));
    info.push_str(&format!("Created: {}\n", format_time(metadata.created())));
    info.push_str(&format!("Modified: {}\n", format_time(metadata.modified())));
    info.push_str(&format!("Accessed: {}\n", format_time(metadata.accessed())));

    if metadata.is_file() {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        info.push_str(&format!("Extension: {}\n", extension));
        info.push_str(&format!("Parent directory: {}\n", parent.display()));
    }

    Ok(info)
}

pub fn search_files(dir_path: &str, pattern: &str) -> ToolResult {
    let root = Path::new(dir_path);
    check_directory(root, dir_path)?;

    // path patterns may match at any depth, like a recursive glob
    let match_paths = pattern.contains('/');
    let matcher = if match_paths && !pattern.starts_with("**/") {
        glob_to_regex(&format!("**/{}", pattern))?
    } else {
        glob_to_regex(pattern)?
    };

    let mut result = String::new();
    let mut found = 0;
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ToolError::io("searching files", e))?;
        let candidate = if match_paths {
            entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/")
        } else {
            entry.file_name().to_string_lossy().into_owned()
        };
        if !matcher.is_match(&candidate) {
            continue;
        }

        found += 1;
        if entry.file_type().is_dir() {
            result.push_str(&format!("[DIR] {}\n", entry.path().display()));
        } else {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            result.push_str(&format!(
                "[FILE] {} ({} bytes)\n",
                entry.path().display(),
                size
            ));
        }
    }

    if found == 0 {
        return Ok(format!(
            "No files found matching pattern '{}' in '{}'",
            pattern, dir_path
        ));
    }

    Ok(format!(
        "Files matching pattern '{}' in '{}':\n\n{}",
        pattern, dir_path, result
    ))
}

pub fn get_current_working_directory() -> ToolResult {
    std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .map_err(|e| ToolError::io("getting current directory", e))
}

pub fn change_working_directory(dir_path: &str) -> ToolResult {
    std::env::set_current_dir(dir_path).map_err(|e| ToolError::io("changing directory", e))?;
    let current = get_current_working_directory()?;
    Ok(format!(
        "Successfully changed directory to '{}'. Current directory: {}",
        dir_path, current
    ))
}

fn check_directory(path: &Path, display: &str) -> std::result::Result<(), ToolError> {
    if !path.exists() {
        return Err(ToolError::not_found(format!(
            "Directory '{}' does not exist",
            display
        )));
    }
    if !path.is_dir() {
        return Err(ToolError::not_a_directory(display));
    }
    Ok(())
}

/// Copying or moving onto an existing directory places the source inside it.
fn into_directory(source: &Path, dst: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) if dst.is_dir() => dst.join(name),
        _ => dst.to_path_buf(),
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(std::io::Error::other)?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Copy then delete the source. A partial copy is removed when the copy fails.
fn move_by_copy(source: &Path, target: &Path) -> std::io::Result<()> {
    let is_dir = source.is_dir();
    let target_existed = target.exists();

    let copied = if is_dir {
        copy_dir_recursive(source, target)
    } else {
        fs::copy(source, target).map(|_| ())
    };
    if let Err(e) = copied {
        if !target_existed {
            let _ = if is_dir {
                fs::remove_dir_all(target)
            } else {
                fs::remove_file(target)
            };
        }
        return Err(e);
    }

    if is_dir {
        fs::remove_dir_all(source)
    } else {
        fs::remove_file(source)
    }
}

fn format_time(time: std::io::Result<SystemTime>) -> String {
    match time {
        Ok(time) => DateTime::<Local>::from(time)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => "unavailable".to_string(),
    }
}

/// Translate a shell wildcard (`*`, `?`, `[...]`, `**`) into an anchored regex.
fn glob_to_regex(pattern: &str) -> std::result::Result<Regex, ToolError> {
    let mut regex = String::from("^");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    // `**/` also matches zero directories
                    chars.next();
                    regex.push_str("(?:.*/)?");
                } else {
                    regex.push_str(".*");
                }
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            '[' => {
                let mut class = String::from("[");
                if chars.peek() == Some(&'!') {
                    chars.next();
                    class.push('^');
                }
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    if c == '\\' {
                        class.push('\\');
                    }
                    class.push(c);
                }
                if !closed {
                    return Err(ToolError::invalid(format!(
                        "Invalid pattern '{}': unclosed '['",
                        pattern
                    )));
                }
                class.push(']');
                regex.push_str(&class);
            }
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex.push('$');

    Regex::new(&regex).map_err(|e| {
        ToolError::new(
            ToolErrorKind::InvalidArgument,
            format!("Invalid pattern '{}': {}", pattern, e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serializes tests that change the process working directory.
    static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let file = path_str(&dir.path().join("sub/dir/test.txt"));

        let msg = write_file(&file, "Hello, World!\nThis is a test file.").unwrap();
        assert_eq!(msg, format!("Successfully wrote to {}", file));
        assert_eq!(
            read_file(&file).unwrap(),
            "Hello, World!\nThis is a test file."
        );
    }

    #[test]
    fn test_read_write_back_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.md");
        let original = "# Title\r\n\nunicode: déjà vu\nno trailing newline";
        fs::write(&file, original).unwrap();

        let file = path_str(&file);
        let content = read_file(&file).unwrap();
        write_file(&file, &content).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), original);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_file("/no/such/file.txt").unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Io);
        assert!(err.render().starts_with("Error reading file: "));
    }

    #[test]
    fn test_list_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("b.txt"), "12345").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();

        let root = path_str(dir.path());
        let listing = list_directory(&root).unwrap();
        assert_eq!(
            listing,
            format!(
                "Contents of '{}':\n\nDirectories:\n[DIR] src\n\nFiles:\n[FILE] a.txt (0 bytes)\n[FILE] b.txt (5 bytes)",
                root
            )
        );
    }

    #[test]
    fn test_list_directory_edge_cases() {
        let dir = tempfile::tempdir().unwrap();
        let root = path_str(dir.path());
        assert_eq!(
            list_directory(&root).unwrap(),
            format!("Directory '{}' is empty", root)
        );

        let file = dir.path().join("f");
        fs::write(&file, "x").unwrap();
        let err = list_directory(&path_str(&file)).unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::NotADirectory);

        let err = list_directory("/nonexistent_dir_xyz").unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::NotFound);
    }

    #[test]
    fn test_copy_move_delete() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        fs::create_dir_all(tree.join("nested")).unwrap();
        fs::write(tree.join("nested/leaf.txt"), "leaf").unwrap();

        let copy = dir.path().join("copy");
        let msg = copy_file_or_path(&path_str(&tree), &path_str(&copy)).unwrap();
        assert!(msg.starts_with("Successfully copied directory"));
        assert_eq!(fs::read_to_string(copy.join("nested/leaf.txt")).unwrap(), "leaf");

        // copying a directory onto an existing one fails like copytree
        assert!(copy_file_or_path(&path_str(&tree), &path_str(&copy)).is_err());

        let moved = dir.path().join("moved.txt");
        move_file_or_path(&path_str(&copy.join("nested/leaf.txt")), &path_str(&moved)).unwrap();
        assert!(moved.exists());
        assert!(!copy.join("nested/leaf.txt").exists());

        // a file copied onto a directory lands inside it
        copy_file_or_path(&path_str(&moved), &path_str(&tree)).unwrap();
        assert!(tree.join("moved.txt").exists());

        let msg = delete_file_or_path(&path_str(&tree)).unwrap();
        assert!(msg.starts_with("Successfully deleted directory"));
        let msg = delete_file_or_path(&path_str(&moved)).unwrap();
        assert!(msg.starts_with("Successfully deleted file"));

        let err = delete_file_or_path(&path_str(&moved)).unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::NotFound);
        let err = move_file_or_path(&path_str(&moved), "elsewhere").unwrap_err();
        assert!(err.render().starts_with("Source path"));
    }

    #[test]
    fn test_file_info() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.md");
        fs::write(&file, "hello").unwrap();

        let info = get_file_info(&path_str(&file)).unwrap();
        assert!(info.contains("Type: File\n"));
        assert!(info.contains("Size: 5 bytes\n"));
        assert!(info.contains("Extension: .md\n"));
        assert!(info.contains(&format!("Parent directory: {}", dir.path().display())));

        let info = get_file_info(&path_str(dir.path())).unwrap();
        assert!(info.contains("Type: Directory\n"));
        assert!(!info.contains("Extension"));
    }

    #[test]
    fn test_search_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pkg/sub")).unwrap();
        fs::write(dir.path().join("main.py"), "print('hi')").unwrap();
        fs::write(dir.path().join("pkg/sub/util.py"), "").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();

        let root = path_str(dir.path());
        let result = search_files(&root, "*.py").unwrap();
        assert!(result.contains("main.py (11 bytes)"));
        assert!(result.contains("util.py"));
        assert!(!result.contains("README.md"));

        let result = search_files(&root, "su?").unwrap();
        assert!(result.contains("[DIR]"));

        let result = search_files(&root, "**/*.py").unwrap();
        assert!(result.contains("main.py"));
        assert!(result.contains("util.py"));

        let result = search_files(&root, "sub/*.py").unwrap();
        assert!(result.contains("util.py"));
        assert!(!result.contains("main.py"));

        let result = search_files(&root, "*.rs").unwrap();
        assert_eq!(
            result,
            format!("No files found matching pattern '*.rs' in '{}'", root)
        );
    }

    #[test]
    fn test_glob_to_regex() {
        let re = glob_to_regex("test_[!0-9]?.py").unwrap();
        assert!(re.is_match("test_ab.py"));
        assert!(!re.is_match("test_1b.py"));
        assert!(!re.is_match("test_ab.pyc"));

        let re = glob_to_regex("src/**/*.rs").unwrap();
        assert!(re.is_match("src/a/b/lib.rs"));
        assert!(re.is_match("src/lib.rs"));
        assert!(glob_to_regex("**/*.py").unwrap().is_match("main.py"));
        assert!(glob_to_regex("**.md").unwrap().is_match("docs/a.md"));
        assert!(!glob_to_regex("*.txt").unwrap().is_match("dir/a.txt"));

        let err = glob_to_regex("[abc").unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArgument);
    }

    #[test]
    fn test_create_directory_nested_and_repeated() {
        let dir = tempfile::tempdir().unwrap();
        let nested = path_str(&dir.path().join("a/b/c"));

        let msg = create_directory(&nested).unwrap();
        assert_eq!(msg, format!("Successfully created directory '{}'", nested));
        assert!(Path::new(&nested).is_dir());
        assert!(create_directory(&nested).is_ok());

        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = create_directory(&path_str(&file)).unwrap_err();
        assert!(err.render().starts_with("Error creating directory: "));
    }

    #[test]
    fn test_change_working_directory() {
        let _guard = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().canonicalize().unwrap();
        let target_str = path_str(&target);

        let msg = change_working_directory(&target_str);
        let now = get_current_working_directory();
        std::env::set_current_dir(&original).unwrap();

        assert_eq!(
            msg.unwrap(),
            format!(
                "Successfully changed directory to '{}'. Current directory: {}",
                target_str, target_str
            )
        );
        assert_eq!(now.unwrap(), target_str);
        assert_eq!(std::env::current_dir().unwrap(), original);

        let err = change_working_directory("/nonexistent_dir_xyz").unwrap_err();
        assert!(err.render().starts_with("Error changing directory: "));
        assert_eq!(std::env::current_dir().unwrap(), original);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_move_by_copy_removes_partial_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src_tree");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.txt"), "a").unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing"), source.join("broken")).unwrap();

        let target = dir.path().join("dst_tree");
        let err = move_by_copy(&source, &target).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert!(!target.exists());
        assert!(source.join("a.txt").exists());
    }

    #[test]
    fn test_move_by_copy_moves_tree() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src_tree");
        fs::create_dir_all(source.join("inner")).unwrap();
        fs::write(source.join("inner/b.txt"), "b").unwrap();

        let target = dir.path().join("dst_tree");
        move_by_copy(&source, &target).unwrap();
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(target.join("inner/b.txt")).unwrap(), "b");
    }
}
