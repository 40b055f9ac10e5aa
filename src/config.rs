//! Loads and validates the build configuration. Settings come from an
//! `mdsite.yaml` project file, searched for in the given directory and then
//! in each of its parents, and may be overridden from the command line:
//!
//! ```yaml
//! InputFolder: docs
//! OutputFolder: /var/www/docs
//! DefaultDocumentName: index
//! TemplateFolder: template   # optional
//! ```
//!
//! Relative folders are resolved against the directory holding the project
//! file (or the working directory when there is no project file).

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// The name of the project file.
pub const PROJECT_FILE_NAME: &str = "mdsite.yaml";

/// The template folder used when `TemplateFolder` isn't set.
pub const DEFAULT_TEMPLATE_FOLDER: &str = "template";

pub const INPUT_FOLDER: &str = "InputFolder";
pub const OUTPUT_FOLDER: &str = "OutputFolder";
pub const DEFAULT_DOCUMENT_NAME: &str = "DefaultDocumentName";
pub const TEMPLATE_FOLDER: &str = "TemplateFolder";

/// Unvalidated settings, as read from a project file and/or the command line.
/// Every field is optional here so that a missing key can be reported by name.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default, rename = "InputFolder")]
    pub input_folder: Option<PathBuf>,

    #[serde(default, rename = "OutputFolder")]
    pub output_folder: Option<PathBuf>,

    #[serde(default, rename = "DefaultDocumentName")]
    pub default_document_name: Option<String>,

    #[serde(default, rename = "TemplateFolder")]
    pub template_folder: Option<PathBuf>,
}

impl Settings {
    /// Reads settings from a project file.
    pub fn from_project_file(path: &Path) -> Result<Settings> {
        let file = std::fs::File::open(path).map_err(|err| ConfigError::OpenProjectFile {
            path: path.to_owned(),
            err,
        })?;
        serde_yaml::from_reader(file).map_err(|err| ConfigError::ParseProjectFile {
            path: path.to_owned(),
            err,
        })
    }

    /// Overlays every setting that is present in `overrides`.
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            input_folder: overrides.input_folder.or(self.input_folder),
            output_folder: overrides.output_folder.or(self.output_folder),
            default_document_name: overrides
                .default_document_name
                .or(self.default_document_name),
            template_folder: overrides.template_folder.or(self.template_folder),
        }
    }

    /// Returns `true` if all required settings are present.
    pub fn is_complete(&self) -> bool {
        self.input_folder.is_some()
            && self.output_folder.is_some()
            && self.default_document_name.is_some()
    }

    /// Checks the settings and turns them into a [`Config`]. Relative paths
    /// are resolved against `root`.
    pub fn validate(self, root: &Path) -> Result<Config> {
        let input_directory = existing_directory(
            INPUT_FOLDER,
            root,
            self.input_folder.ok_or(ConfigError::MissingKey(INPUT_FOLDER))?,
        )?;
        let output_directory = existing_directory(
            OUTPUT_FOLDER,
            root,
            self.output_folder
                .ok_or(ConfigError::MissingKey(OUTPUT_FOLDER))?,
        )?;
        let default_document_name = self
            .default_document_name
            .ok_or(ConfigError::MissingKey(DEFAULT_DOCUMENT_NAME))?;
        if default_document_name.is_empty()
            || default_document_name.contains('/')
            || default_document_name.contains('\\')
        {
            return Err(ConfigError::InvalidDocumentName(default_document_name));
        }
        let template_directory = existing_directory(
            TEMPLATE_FOLDER,
            root,
            self.template_folder
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_FOLDER)),
        )?;

        Ok(Config {
            input_directory,
            output_directory,
            default_document_name,
            template_directory,
        })
    }
}

/// The validated build configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The root of the markdown document tree.
    pub input_directory: PathBuf,

    /// The root of the generated site.
    pub output_directory: PathBuf,

    /// The extension-less name of each folder's landing page, e.g. `index`.
    /// Breadcrumb entries for the root and for folders link to it.
    pub default_document_name: String,

    /// The folder holding `template.html` and `style.css`.
    pub template_directory: PathBuf,
}

impl Config {
    /// Finds the project file in `dir` or the nearest parent directory of
    /// `dir`, applies `overrides`, and validates the result. When `overrides`
    /// already holds every required setting, no project file is needed.
    pub fn from_directory(dir: &Path, overrides: Settings) -> Result<Config> {
        match find_project_file(dir) {
            Some(path) => Config::from_project_file(&path, overrides),
            None if overrides.is_complete() => overrides.validate(dir),
            None => Err(ConfigError::ProjectFileNotFound(dir.to_owned())),
        }
    }

    /// Loads the project file at `path`, applies `overrides`, and validates
    /// the result.
    pub fn from_project_file(path: &Path, overrides: Settings) -> Result<Config> {
        tracing::debug!("Loading project file {}", path.display());
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        Settings::from_project_file(path)?
            .merge(overrides)
            .validate(root)
    }
}

fn find_project_file(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .map(|ancestor| ancestor.join(PROJECT_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

fn existing_directory(key: &'static str, root: &Path, path: PathBuf) -> Result<PathBuf> {
    let path = root.join(path);
    let metadata = std::fs::metadata(&path).map_err(|_| ConfigError::NotFound {
        key,
        path: path.clone(),
    })?;
    match metadata.is_dir() {
        true => Ok(path),
        false => Err(ConfigError::NotADirectory { key, path }),
    }
}

/// The result of loading or validating configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Represents a configuration problem. All of these stop the program before
/// any document is processed.
#[derive(Debug)]
pub enum ConfigError {
    /// A required setting is absent.
    MissingKey(&'static str),

    /// A configured folder doesn't exist.
    NotFound { key: &'static str, path: PathBuf },

    /// A configured folder exists but isn't a directory.
    NotADirectory { key: &'static str, path: PathBuf },

    /// The default document name is empty or contains a path separator.
    InvalidDocumentName(String),

    /// No project file was found in the directory or any of its parents.
    ProjectFileNotFound(PathBuf),

    /// The project file couldn't be opened.
    OpenProjectFile { path: PathBuf, err: std::io::Error },

    /// The project file isn't valid YAML or has the wrong shape.
    ParseProjectFile { path: PathBuf, err: serde_yaml::Error },
}

impl fmt::Display for ConfigError {
    /// Displays a [`ConfigError`] as a diagnostic naming the offending key or
    /// path.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::MissingKey(key) => write!(
                f,
                "The setting \"{}\" is missing. Please make sure \"{}\", \"{}\", and \"{}\" \
                 are all set",
                key, INPUT_FOLDER, OUTPUT_FOLDER, DEFAULT_DOCUMENT_NAME,
            ),
            ConfigError::NotFound { key, path } => write!(
                f,
                "Directory \"{}\" was not found. Please revise the value for \"{}\".",
                path.display(),
                key,
            ),
            ConfigError::NotADirectory { key, path } => match path.extension() {
                Some(_) => write!(
                    f,
                    "\"{}\" points to a file! Please change \"{}\" to its parent directory \
                     or another appropriate directory.",
                    path.display(),
                    key,
                ),
                None => write!(
                    f,
                    "\"{}\" isn't a directory! Please revise the value for \"{}\".",
                    path.display(),
                    key,
                ),
            },
            ConfigError::InvalidDocumentName(name) => write!(
                f,
                "\"{}\" isn't a valid value for \"{}\"; use a bare file name without an \
                 extension, e.g. \"index\".",
                name, DEFAULT_DOCUMENT_NAME,
            ),
            ConfigError::ProjectFileNotFound(dir) => write!(
                f,
                "Could not find `{}` in '{}' or any parent directory",
                PROJECT_FILE_NAME,
                dir.display(),
            ),
            ConfigError::OpenProjectFile { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            ConfigError::ParseProjectFile { path, err } => {
                write!(f, "Parsing project file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    /// Implements [`std::error::Error`] for [`ConfigError`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::OpenProjectFile { path: _, err } => Some(err),
            ConfigError::ParseProjectFile { path: _, err } => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn project() -> std::io::Result<TempDir> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("docs"))?;
        fs::create_dir(dir.path().join("site"))?;
        fs::create_dir(dir.path().join("template"))?;
        Ok(dir)
    }

    fn settings(input: &str, output: &str, name: &str) -> Settings {
        Settings {
            input_folder: Some(PathBuf::from(input)),
            output_folder: Some(PathBuf::from(output)),
            default_document_name: Some(name.to_owned()),
            template_folder: None,
        }
    }

    #[test]
    fn test_from_project_file() -> TestResult {
        let dir = project()?;
        fs::write(
            dir.path().join(PROJECT_FILE_NAME),
            "InputFolder: docs\nOutputFolder: site\nDefaultDocumentName: index\n",
        )?;
        fs::create_dir(dir.path().join("docs").join("nested"))?;

        let config = Config::from_directory(&dir.path().join("docs/nested"), Settings::default())?;
        assert_eq!(
            config,
            Config {
                input_directory: dir.path().join("docs"),
                output_directory: dir.path().join("site"),
                default_document_name: "index".to_owned(),
                template_directory: dir.path().join("template"),
            }
        );
        Ok(())
    }

    #[test]
    fn test_overrides_win() -> TestResult {
        let dir = project()?;
        fs::create_dir(dir.path().join("elsewhere"))?;
        fs::write(
            dir.path().join(PROJECT_FILE_NAME),
            "InputFolder: docs\nOutputFolder: site\nDefaultDocumentName: index\n",
        )?;
        let overrides = Settings {
            output_folder: Some(dir.path().join("elsewhere")),
            default_document_name: Some("home".to_owned()),
            ..Settings::default()
        };

        let config = Config::from_directory(dir.path(), overrides)?;
        assert_eq!(config.output_directory, dir.path().join("elsewhere"));
        assert_eq!(config.default_document_name, "home");
        Ok(())
    }

    #[test]
    fn test_no_project_file_needed_when_complete() -> TestResult {
        let dir = project()?;
        let config = Config::from_directory(dir.path(), settings("docs", "site", "index"))?;
        assert_eq!(config.input_directory, dir.path().join("docs"));
        Ok(())
    }

    #[test]
    fn test_missing_key() -> TestResult {
        let dir = project()?;
        let mut incomplete = settings("docs", "site", "index");
        incomplete.output_folder = None;
        match incomplete.validate(dir.path()) {
            Err(ConfigError::MissingKey(key)) => assert_eq!(key, OUTPUT_FOLDER),
            other => panic!("wanted MissingKey, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_missing_key_in_project_file() -> TestResult {
        let dir = project()?;
        fs::write(
            dir.path().join(PROJECT_FILE_NAME),
            "InputFolder: docs\nOutputFolder: site\n",
        )?;
        match Config::from_directory(dir.path(), Settings::default()) {
            Err(ConfigError::MissingKey(key)) => assert_eq!(key, DEFAULT_DOCUMENT_NAME),
            other => panic!("wanted MissingKey, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_not_found() -> TestResult {
        let dir = project()?;
        match settings("nope", "site", "index").validate(dir.path()) {
            Err(ConfigError::NotFound { key, path }) => {
                assert_eq!(key, INPUT_FOLDER);
                assert_eq!(path, dir.path().join("nope"));
            }
            other => panic!("wanted NotFound, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_not_a_directory() -> TestResult {
        let dir = project()?;
        fs::write(dir.path().join("site.txt"), "")?;
        let err = settings("docs", "site.txt", "index")
            .validate(dir.path())
            .unwrap_err();
        match &err {
            ConfigError::NotADirectory { key, .. } => assert_eq!(*key, OUTPUT_FOLDER),
            other => panic!("wanted NotADirectory, got {:?}", other),
        }
        assert!(err.to_string().contains("points to a file"));
        Ok(())
    }

    #[test]
    fn test_invalid_document_name() -> TestResult {
        let dir = project()?;
        match settings("docs", "site", "sub/index").validate(dir.path()) {
            Err(ConfigError::InvalidDocumentName(name)) => assert_eq!(name, "sub/index"),
            other => panic!("wanted InvalidDocumentName, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_project_file_not_found() -> TestResult {
        let dir = tempfile::tempdir()?;
        match Config::from_directory(dir.path(), Settings::default()) {
            Err(ConfigError::ProjectFileNotFound(_)) => Ok(()),
            other => panic!("wanted ProjectFileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_project_file() -> TestResult {
        let dir = project()?;
        fs::write(dir.path().join(PROJECT_FILE_NAME), "InputFolder: [unclosed")?;
        match Config::from_directory(dir.path(), Settings::default()) {
            Err(ConfigError::ParseProjectFile { .. }) => Ok(()),
            other => panic!("wanted ParseProjectFile, got {:?}", other),
        }
    }
}
