use std::collections::HashMap;
use std::fs::{create_dir_all, read_to_string, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Error;

type IniMap = HashMap<String, HashMap<String, Option<String>>>;

// a handle to a working tree and its .git directory, not mutated after
// construction
#[derive(Debug, Clone)]
pub struct Repository {
    pub worktree: PathBuf,
    pub gitdir: PathBuf,
    config: IniMap,
}

fn default_config_text() -> &'static str {
    "[core]\n\
     repositoryformatversion = 0\n\
     filemode = false\n\
     bare = false\n"
}

fn is_git_repo(path: &Path) -> bool {
    path.join(".git").is_dir()
}

fn parse_config(path: &Path) -> Result<IniMap, Error> {
    if !path.exists() {
        return Err(Error::ConfigMissing(path.display().to_string()));
    }
    let text = path
        .to_str()
        .ok_or_else(|| Error::BadConfig(path.display().to_string()))?;
    ini::ini!(safe text).map_err(Error::BadConfig)
}

fn repositoryformatversion(config: &IniMap) -> Result<String, Error> {
    config
        .get("core")
        .and_then(|core| core.get("repositoryformatversion"))
        .and_then(|v| v.clone())
        .ok_or_else(|| Error::BadConfig("missing core.repositoryformatversion".to_string()))
}

impl Repository {
    pub fn open(worktree: impl AsRef<Path>) -> Result<Repository, Error> {
        let worktree = worktree.as_ref().to_path_buf();
        let gitdir = worktree.join(".git");

        if !gitdir.is_dir() {
            return Err(Error::NotARepository);
        }

        let config = parse_config(&gitdir.join("config"))?;
        let version = repositoryformatversion(&config)?;
        if version != "0" {
            return Err(Error::UnsupportedFormat(version));
        }

        log::debug!("opened repository at {}", worktree.display());
        Ok(Repository {
            worktree,
            gitdir,
            config,
        })
    }

    pub fn discover(start: impl AsRef<Path>) -> Result<Repository, Error> {
        let mut path = start.as_ref().canonicalize()?;

        loop {
            if is_git_repo(&path) {
                return Repository::open(path);
            }
            match path.parent() {
                Some(parent) => path = parent.to_path_buf(),
                None => return Err(Error::NotARepository),
            }
        }
    }

    pub fn create(worktree: impl AsRef<Path>) -> Result<Repository, Error> {
        let worktree = worktree.as_ref().to_path_buf();

        if worktree.exists() {
            if !worktree.is_dir() {
                return Err(Error::NotADirectory(worktree.display().to_string()));
            }
            let gitdir = worktree.join(".git");
            if gitdir.exists() && gitdir.read_dir()?.next().is_some() {
                return Err(Error::AlreadyExists(worktree.display().to_string()));
            }
        } else {
            create_dir_all(&worktree)?;
        }

        let gitdir = worktree.join(".git");
        create_dir_all(gitdir.join("branches"))?;
        create_dir_all(gitdir.join("objects"))?;
        create_dir_all(gitdir.join("refs/heads"))?;
        create_dir_all(gitdir.join("refs/tags"))?;

        let mut description = File::create(gitdir.join("description"))?;
        writeln!(
            description,
            "Unnamed repository; edit this file 'description' to name the repository."
        )?;

        let mut head = File::create(gitdir.join("HEAD"))?;
        write!(head, "ref: refs/heads/master\n")?;

        let mut config_file = File::create(gitdir.join("config"))?;
        write!(config_file, "{}", default_config_text())?;

        log::debug!("created repository at {}", worktree.display());
        Repository::open(worktree)
    }

    pub fn path(&self, segments: &[&str], create_parents: bool) -> Result<PathBuf, Error> {
        let mut full = self.gitdir.clone();
        for seg in segments {
            full.push(seg);
        }

        if let Some(parent) = full.parent() {
            if parent.exists() && !parent.is_dir() {
                return Err(Error::NotADirectory(parent.display().to_string()));
            }
            if create_parents {
                create_dir_all(parent)?;
            }
        }

        Ok(full)
    }

    // literal bytes of .git/HEAD, no ref resolution
    pub fn head(&self) -> Result<String, Error> {
        Ok(read_to_string(self.gitdir.join("HEAD"))?)
    }
}
