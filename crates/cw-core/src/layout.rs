//! Persisted window layout
//!
//! Window geometry is remembered per connection so a console reopens where
//! the user left it. Positions of docked windows are stored in canvas
//! viewport space; undocked ones in screen space.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::geometry::{Point, Rect, Size};

/// Last known geometry of a console window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub is_maximized: bool,
}

impl StoredLayout {
    pub fn new(rect: Rect, is_maximized: bool) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            is_maximized,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position(), self.size())
    }
}

/// Get/set store for window layouts, keyed by connection id
pub trait LayoutStore: Send + Sync {
    fn get(&self, id: &str) -> Option<StoredLayout>;

    fn set(&self, id: &str, layout: StoredLayout);
}

/// Process-lifetime layout store
#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
    layouts: Mutex<HashMap<String, StoredLayout>>,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layouts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LayoutStore for MemoryLayoutStore {
    fn get(&self, id: &str) -> Option<StoredLayout> {
        self.layouts.lock().get(id).copied()
    }

    fn set(&self, id: &str, layout: StoredLayout) {
        self.layouts.lock().insert(id.to_string(), layout);
    }
}

/// Layout store backed by a JSON file.
///
/// Every `set` rewrites the file; write failures are logged and the
/// in-memory copy stays authoritative.
#[derive(Debug)]
pub struct FileLayoutStore {
    path: PathBuf,
    layouts: Mutex<HashMap<String, StoredLayout>>,
}

impl FileLayoutStore {
    /// Open a store, loading existing layouts if the file exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let layouts = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::Invalid(format!("Failed to read layouts: {}", e)))?;
            serde_json::from_str(&content)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            layouts: Mutex::new(layouts),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all layouts to disk
    pub fn persist(&self) -> Result<(), ConfigError> {
        let content = {
            let layouts = self.layouts.lock();
            serde_json::to_string_pretty(&*layouts)?
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Invalid(format!("Failed to create layout dir: {}", e)))?;
        }

        std::fs::write(&self.path, content)
            .map_err(|e| ConfigError::Invalid(format!("Failed to write layouts: {}", e)))?;

        Ok(())
    }
}

impl LayoutStore for FileLayoutStore {
    fn get(&self, id: &str) -> Option<StoredLayout> {
        self.layouts.lock().get(id).copied()
    }

    fn set(&self, id: &str, layout: StoredLayout) {
        self.layouts.lock().insert(id.to_string(), layout);
        if let Err(e) = self.persist() {
            tracing::warn!("Failed to persist layout for {}: {}", id, e);
        }
    }
}
