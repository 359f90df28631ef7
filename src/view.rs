//! View loading.
//!
//! Rendering is not the pipeline's business. A [`View`] turns a view path
//! into a value; [`Pipeline::view`](crate::Pipeline::view) only forwards to
//! whichever loader the host installed.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;

use crate::error::BoxError;

/// Loads or executes a view resource.
pub trait View: 'static {
    fn render(&self, path: &str) -> Result<Value, BoxError>;
}

impl<F> View for F
where
    F: Fn(&str) -> Result<Value, BoxError> + 'static,
{
    fn render(&self, path: &str) -> Result<Value, BoxError> {
        self(path)
    }
}

/// Serves view files from a directory as UTF-8 strings.
///
/// Paths are relative to the root; absolute paths and `..` are refused.
#[derive(Clone, Debug)]
pub struct Directory {
    root: PathBuf,
}

impl Directory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let rel = Path::new(path);
        if rel.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
            Ok(self.root.join(rel))
        } else {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("view path `{path}` is not relative to the view root"),
            ))
        }
    }
}

impl View for Directory {
    fn render(&self, path: &str) -> Result<Value, BoxError> {
        let file = self.resolve(path)?;
        Ok(Value::String(fs::read_to_string(file)?))
    }
}
