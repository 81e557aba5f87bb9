use std::path::{Path, PathBuf};

use fastrace::trace;
use notebook_fs::{ensure_file, read_lines, write_lines};
use notebook_types::User;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::mapper::UserMapper;

/// The operations the notebook front ends need from a record store.
pub trait Repository {
    /// All records in stored order.
    fn find_all(&self) -> Result<Vec<User>>;

    /// Stores `user` under the next free id and returns it with that id set.
    ///
    /// Any id already on `user` is ignored.
    fn create(&self, user: User) -> Result<User>;

    fn find_by_id(&self, id: u64) -> Result<Option<User>>;

    /// Overwrites the non-empty fields of `patch` onto the record with `id`.
    ///
    /// Returns `patch` itself, not the merged record, or `None` when no
    /// record has that id.
    fn update(&self, id: u64, patch: User) -> Result<Option<User>>;

    /// Removes every record with `id`, returning whether anything was removed.
    fn delete(&self, id: u64) -> Result<bool>;

    /// Raw lines of the store, bypassing the mapper.
    fn read_all(&self) -> Result<Vec<String>>;

    /// Replaces the store with raw `lines`, bypassing the mapper.
    fn save_all(&self, lines: &[String]) -> Result<()>;
}

/// Record store backed by a single line-per-record file.
///
/// Nothing is cached between calls: each operation loads the full file and
/// mutations rewrite it in full.
pub struct UserRepository {
    path: PathBuf,
    mapper: UserMapper,
}

impl UserRepository {
    /// Opens the store at `path`, creating an empty file if none exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if ensure_file(&path)? {
            debug!("Initialized empty store at {}", path.display());
        }
        Ok(Self {
            path,
            mapper: UserMapper::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[trace]
    fn load(&self) -> Result<Vec<User>> {
        let lines = read_lines(&self.path)?;
        let users = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                self.mapper
                    .deserialize(line)
                    .map_err(|source| StoreError::Parse { line: i + 1, source })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!("Loaded {} record(s) from {}", users.len(), self.path.display());
        Ok(users)
    }

    #[trace]
    fn write(&self, users: &[User]) -> Result<()> {
        let lines: Vec<String> = users.iter().map(|u| self.mapper.serialize(u)).collect();
        write_lines(&self.path, &lines)?;
        Ok(())
    }
}

impl Repository for UserRepository {
    fn find_all(&self) -> Result<Vec<User>> {
        self.load()
    }

    fn create(&self, mut user: User) -> Result<User> {
        let mut users = self.load()?;
        let max = users.iter().map(|u| u.id).max().unwrap_or(0);
        user.id = max.checked_add(1).ok_or(StoreError::IdsExhausted(max))?;
        users.push(user.clone());
        self.write(&users)?;
        debug!("Created record {}", user.id);
        Ok(user)
    }

    fn find_by_id(&self, id: u64) -> Result<Option<User>> {
        Ok(self.load()?.into_iter().find(|u| u.id == id))
    }

    fn update(&self, id: u64, patch: User) -> Result<Option<User>> {
        let mut users = self.load()?;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.apply_patch(&patch);
        self.write(&users)?;
        debug!("Updated record {}", id);
        Ok(Some(patch))
    }

    fn delete(&self, id: u64) -> Result<bool> {
        let mut users = self.load()?;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(false);
        }
        self.write(&users)?;
        debug!("Deleted record {}", id);
        Ok(true)
    }

    fn read_all(&self) -> Result<Vec<String>> {
        Ok(read_lines(&self.path)?)
    }

    fn save_all(&self, lines: &[String]) -> Result<()> {
        write_lines(&self.path, lines)?;
        Ok(())
    }
}
