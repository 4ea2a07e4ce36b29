//! Album mirroring for external-library assets: directory structure on the
//! library mount becomes album membership on the server.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use picsync_api::{Asset, RemoteApi};
use tracing::{debug, error, info, warn};

/// Snapshot of the server's albums, fetched once per run: album name to
/// member-ID set, and album name to album ID.
///
/// Names are not unique server-side. When two albums share a name, the one
/// fetched last wins both maps; an accepted limitation, surfaced in the
/// debug log.
#[derive(Debug, Default)]
pub struct AlbumTree {
    pub members: HashMap<String, HashSet<String>>,
    pub ids: HashMap<String, String>,
}

impl AlbumTree {
    /// Union of every album's membership, for the only-new filter.
    pub fn all_member_ids(&self) -> HashSet<&str> {
        self.members
            .values()
            .flat_map(|ids| ids.iter().map(String::as_str))
            .collect()
    }
}

/// Fetch the album tree. Any failure along the way yields an empty tree,
/// which downstream planning treats as "every album is new".
pub async fn fetch_album_tree(api: &impl RemoteApi) -> AlbumTree {
    let summaries = match api.list_albums().await {
        Ok(summaries) => summaries,
        Err(err) => {
            error!(error = %err, "failed to list albums");
            return AlbumTree::default();
        }
    };

    let mut tree = AlbumTree::default();
    for summary in summaries {
        let detail = match api.album_detail(&summary.id).await {
            Ok(detail) => detail,
            Err(err) => {
                error!(album_id = %summary.id, error = %err, "failed to fetch album");
                return AlbumTree::default();
            }
        };

        let member_ids: HashSet<String> = detail.assets.into_iter().map(|a| a.id).collect();
        if tree.ids.insert(detail.album_name.clone(), detail.id).is_some() {
            debug!(name = %detail.album_name, "duplicate album name, keeping the last one fetched");
        }
        tree.members.insert(detail.album_name, member_ids);
    }

    info!(albums = tree.ids.len(), "album tree fetched");
    tree
}

/// Album name for an asset: its parent directory relative to the library
/// root, with path separators replaced by spaces. `None` when the asset's
/// recorded path does not live under the root.
pub fn album_name_for(original_path: &str, library_root: &Path) -> Option<String> {
    let relative = Path::new(original_path).strip_prefix(library_root).ok()?;
    let parent = relative.parent()?;
    let segments: Vec<_> = parent.iter().map(|s| s.to_string_lossy()).collect();
    Some(segments.join(" "))
}

/// The actions a run will take: albums to create (name to member IDs) and
/// existing albums to extend (album ID to new member IDs). Maps are ordered
/// so runs apply, log, and test deterministically.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AlbumPlan {
    pub create: BTreeMap<String, Vec<String>>,
    pub extend: BTreeMap<String, Vec<String>>,
}

impl AlbumPlan {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.extend.is_empty()
    }
}

/// Build the membership plan for external-library assets.
///
/// With `only_new`, assets already sitting in any album are dropped up
/// front. The rest either extend an existing album of the same name (when
/// not already members) or are grouped into a new album to create.
pub fn plan_albums(
    assets: &[Asset],
    tree: &AlbumTree,
    library_root: &Path,
    only_new: bool,
) -> AlbumPlan {
    let mut plan = AlbumPlan::default();

    let known = if only_new {
        tree.all_member_ids()
    } else {
        HashSet::new()
    };

    let mut considered = 0usize;
    for asset in assets {
        if only_new && known.contains(asset.id.as_str()) {
            continue;
        }
        considered += 1;

        let Some(path) = asset.original_path.as_deref() else {
            warn!(id = %asset.id, "asset has no recorded path, skipping");
            continue;
        };
        let Some(album_name) = album_name_for(path, library_root) else {
            warn!(id = %asset.id, path, "asset outside library root, skipping");
            continue;
        };

        match tree.members.get(&album_name) {
            Some(members) if members.contains(&asset.id) => {}
            Some(_) => {
                // Name exists remotely; queue for extension under its ID.
                if let Some(album_id) = tree.ids.get(&album_name) {
                    plan.extend
                        .entry(album_id.clone())
                        .or_default()
                        .push(asset.id.clone());
                }
            }
            None => {
                plan.create
                    .entry(album_name)
                    .or_default()
                    .push(asset.id.clone());
            }
        }
    }

    info!(
        considered,
        new_albums = plan.create.len(),
        extended_albums = plan.extend.len(),
        "album plan built"
    );
    plan
}

/// Apply a plan: create the new albums, then extend the existing ones.
/// Failures are logged and the loop keeps going.
pub async fn apply_plan(api: &impl RemoteApi, plan: &AlbumPlan) {
    for (name, asset_ids) in &plan.create {
        info!(album = %name, assets = asset_ids.len(), "creating album");
        if let Err(err) = api.create_album(name, asset_ids).await {
            error!(album = %name, error = %err, "failed to create album");
        }
    }

    for (album_id, asset_ids) in &plan.extend {
        info!(album_id = %album_id, assets = asset_ids.len(), "adding assets to album");
        match api.add_to_album(album_id, asset_ids).await {
            Ok(results) => {
                for result in results.iter().filter(|r| !r.success) {
                    error!(
                        album_id = %album_id,
                        asset_id = result.id.as_deref().unwrap_or("unknown"),
                        reason = result.error.as_deref().unwrap_or("unknown"),
                        "asset not added to album"
                    );
                }
            }
            Err(err) => {
                error!(album_id = %album_id, error = %err, "failed to add assets to album");
            }
        }
    }
}
