//! Sequential directory walker that yields regular files beneath a root.
//!
//! The walk is a depth-first traversal driven by an explicit work stack. Within
//! each directory, entries are visited in byte order of their names: files of
//! the directory first, then its subdirectories. The ordering only exists to
//! make repeated runs over an unchanged tree report identically; callers must
//! not depend on it otherwise.
//!
//! Safety invariants:
//! - Symlinks to files (and dangling links) are yielded; the link is the candidate
//! - Symlinked directories are entered only with `follow_symlinks`, and then each
//!   physical directory at most once
//! - Bounded by `max_depth` when configured
//! - A missing root yields nothing; unreadable subdirectories are reported and skipped

#![allow(missing_docs)]

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Walker configuration derived from `PurgeSettings`.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    pub root: PathBuf,
    /// Directory levels to descend below the root. `Some(0)` visits only the
    /// root's own files; `None` is unbounded.
    pub max_depth: Option<usize>,
    pub follow_symlinks: bool,
}

impl WalkerConfig {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: None,
            follow_symlinks: false,
        }
    }
}

/// A candidate file discovered during the walk. Metadata is not read here; the
/// caller stats only the entries it cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    /// The entry itself is a symlink; removing it unlinks the link.
    pub via_symlink: bool,
}

/// Item produced by [`Walk`].
#[derive(Debug)]
pub enum WalkEvent {
    File(WalkEntry),
    /// A directory below the root could not be listed; its subtree is skipped.
    SkippedDir { path: PathBuf, source: io::Error },
}

/// Directory walker over a single root.
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    config: WalkerConfig,
}

impl DirectoryWalker {
    #[must_use]
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Lazily walk the tree.
    #[must_use]
    pub fn iter(&self) -> Walk {
        Walk::start(self.config.clone())
    }

    /// Collect every regular file path, discarding skipped-directory reports.
    #[must_use]
    pub fn files(&self) -> Vec<PathBuf> {
        self.iter()
            .filter_map(|event| match event {
                WalkEvent::File(entry) => Some(entry.path),
                WalkEvent::SkippedDir { .. } => None,
            })
            .collect()
    }
}

impl IntoIterator for &DirectoryWalker {
    type Item = WalkEvent;
    type IntoIter = Walk;

    fn into_iter(self) -> Walk {
        self.iter()
    }
}

/// Iterator state: pending directories plus events buffered from the current one.
#[derive(Debug)]
pub struct Walk {
    config: WalkerConfig,
    /// (directory, depth below root)
    stack: Vec<(PathBuf, usize)>,
    ready: VecDeque<WalkEvent>,
    visited: HashSet<PathBuf>,
}

impl Walk {
    fn start(config: WalkerConfig) -> Self {
        let mut walk = Self {
            stack: Vec::new(),
            ready: VecDeque::new(),
            visited: HashSet::new(),
            config,
        };

        // The root itself is always resolved through symlinks.
        match fs::metadata(&walk.config.root) {
            Ok(meta) if meta.is_dir() => {
                let root = walk.config.root.clone();
                if walk.config.follow_symlinks {
                    walk.mark_visited(&root);
                }
                walk.stack.push((root, 0));
            }
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(source) => walk.ready.push_back(WalkEvent::SkippedDir {
                path: walk.config.root.clone(),
                source,
            }),
        }
        walk
    }

    /// Returns false if the directory was already entered.
    fn mark_visited(&mut self, dir: &Path) -> bool {
        let key = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        self.visited.insert(key)
    }

    fn may_descend(&self, child_depth: usize) -> bool {
        self.config.max_depth.is_none_or(|max| child_depth <= max)
    }

    fn process_directory(&mut self, dir: &Path, depth: usize) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                self.ready.push_back(WalkEvent::SkippedDir {
                    path: dir.to_path_buf(),
                    source,
                });
                return;
            }
        };

        let mut children: Vec<fs::DirEntry> = entries.filter_map(std::result::Result::ok).collect();
        children.sort_by_key(fs::DirEntry::file_name);

        let mut subdirs: Vec<PathBuf> = Vec::new();
        for entry in children {
            let Ok(ft) = entry.file_type() else {
                continue;
            };
            let path = entry.path();

            if ft.is_symlink() {
                match fs::metadata(&path) {
                    Ok(target) if target.is_dir() => {
                        if self.config.follow_symlinks {
                            subdirs.push(path);
                        }
                    }
                    Ok(target) if !target.is_file() => {}
                    // Links to files and dangling links are candidates; a dangling
                    // link surfaces as a stat failure in the caller.
                    _ => self.ready.push_back(WalkEvent::File(WalkEntry {
                        path,
                        via_symlink: true,
                    })),
                }
            } else if ft.is_dir() {
                subdirs.push(path);
            } else if ft.is_file() {
                self.ready.push_back(WalkEvent::File(WalkEntry {
                    path,
                    via_symlink: false,
                }));
            }
        }

        let child_depth = depth + 1;
        if !self.may_descend(child_depth) {
            return;
        }
        // Reverse so the stack pops subdirectories in name order.
        for sub in subdirs.into_iter().rev() {
            if self.config.follow_symlinks && !self.mark_visited(&sub) {
                continue;
            }
            self.stack.push((sub, child_depth));
        }
    }
}

impl Iterator for Walk {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Some(event);
            }
            let (dir, depth) = self.stack.pop()?;
            self.process_directory(&dir, depth);
        }
    }
}
