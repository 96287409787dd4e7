//! Layered resolution across the overlay root and the base root.
//!
//! When an overlay is active its directory is searched first, then the base
//! fixture directory. Any hit in the overlay shadows the base, whichever tier
//! produced it.

use parking_lot::RwLock;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::search::{DirectorySearch, Tier};
use super::types::{OverlayError, RequestDescriptor};

/// Check that an overlay name is a single plain directory name.
pub fn validate_overlay_name(name: &str) -> Result<(), OverlayError> {
    if name.is_empty() {
        return Err(OverlayError::Empty);
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(OverlayError::InvalidName(name.to_string())),
    }
}

/// The active overlay name, shared by the server and read on every request.
#[derive(Debug, Default)]
pub struct OverlayState {
    current: RwLock<Option<String>>,
}

impl OverlayState {
    pub fn new(initial: Option<String>) -> Result<Self, OverlayError> {
        if let Some(ref name) = initial {
            validate_overlay_name(name)?;
        }
        Ok(Self {
            current: RwLock::new(initial),
        })
    }

    /// Snapshot of the active overlay.
    pub fn get(&self) -> Option<String> {
        self.current.read().clone()
    }

    /// Switch (or clear) the active overlay. Returns the previous value.
    pub fn set(&self, overlay: Option<String>) -> Result<Option<String>, OverlayError> {
        if let Some(ref name) = overlay {
            validate_overlay_name(name)?;
        }
        let mut current = self.current.write();
        Ok(std::mem::replace(&mut *current, overlay))
    }
}

/// Which layer a root belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootKind {
    Overlay(String),
    Base,
}

impl RootKind {
    pub fn label(&self) -> &'static str {
        match self {
            RootKind::Overlay(_) => "overlay",
            RootKind::Base => "base",
        }
    }

    /// Prefix used when showing paths under this root.
    fn display_prefix(&self) -> String {
        match self {
            RootKind::Overlay(name) => format!("/overlays/{name}"),
            RootKind::Base => "/mocks".to_string(),
        }
    }
}

/// One directory to search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoot {
    pub kind: RootKind,
    pub dir: PathBuf,
}

/// Ordered roots for one request, first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoots(Vec<SearchRoot>);

impl SearchRoots {
    pub fn iter(&self) -> impl Iterator<Item = &SearchRoot> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: PathBuf,
    pub tier: Tier,
    pub root: SearchRoot,
}

impl Resolution {
    /// Path shown in logs and history: `/mocks/...` or `/overlays/<name>/...`.
    pub fn display_path(&self) -> String {
        let relative = self
            .path
            .strip_prefix(&self.root.dir)
            .unwrap_or(&self.path)
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.root.kind.display_prefix(), relative)
    }
}

/// Resolves requests against the overlay and base fixture roots.
#[derive(Debug)]
pub struct LayeredResolver {
    mocks_dir: PathBuf,
    overlays_dir: PathBuf,
    overlay: Arc<OverlayState>,
}

impl LayeredResolver {
    pub fn new(
        mocks_dir: impl Into<PathBuf>,
        overlays_dir: impl Into<PathBuf>,
        overlay: Arc<OverlayState>,
    ) -> Self {
        Self {
            mocks_dir: mocks_dir.into(),
            overlays_dir: overlays_dir.into(),
            overlay,
        }
    }

    pub fn mocks_dir(&self) -> &Path {
        &self.mocks_dir
    }

    pub fn overlays_dir(&self) -> &Path {
        &self.overlays_dir
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    /// Roots for a request, built from the overlay active right now.
    pub fn search_roots(&self) -> SearchRoots {
        let mut roots = Vec::with_capacity(2);
        if let Some(name) = self.overlay.get() {
            roots.push(SearchRoot {
                dir: self.overlays_dir.join(&name),
                kind: RootKind::Overlay(name),
            });
        }
        roots.push(SearchRoot {
            kind: RootKind::Base,
            dir: self.mocks_dir.clone(),
        });
        SearchRoots(roots)
    }

    /// Resolve a request against the current roots.
    pub fn resolve(&self, request: &RequestDescriptor) -> Option<Resolution> {
        Self::resolve_in(&self.search_roots(), request)
    }

    /// Resolve a request against an explicit list of roots.
    pub fn resolve_in(roots: &SearchRoots, request: &RequestDescriptor) -> Option<Resolution> {
        roots.iter().find_map(|root| {
            DirectorySearch::new(&root.dir)
                .find(request)
                .map(|hit| Resolution {
                    path: hit.path,
                    tier: hit.tier,
                    root: root.clone(),
                })
        })
    }
}
