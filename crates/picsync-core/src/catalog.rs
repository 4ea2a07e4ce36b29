//! Candidate catalog assembly over the paged metadata search.

use picsync_api::{Asset, RemoteApi};
use tracing::{debug, error, info};

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Which side of the origin-tag split a run operates on: downloads exclude
/// external-library imports, album mirroring processes only them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginFilter {
    ExcludeExternal,
    OnlyExternal,
}

impl OriginFilter {
    pub fn keeps(self, asset: &Asset) -> bool {
        match self {
            OriginFilter::ExcludeExternal => !asset.is_external(),
            OriginFilter::OnlyExternal => asset.is_external(),
        }
    }
}

/// Walk the paged search from page 1 and accumulate the filtered items in
/// encounter order.
///
/// Pagination is fail-soft: a page error or an empty page ends the walk and
/// whatever was accumulated so far is returned, since a partial catalog is
/// still usable. Only the absence of a next-page marker is a normal
/// termination.
pub async fn fetch_catalog(
    api: &impl RemoteApi,
    filter: OriginFilter,
    page_size: u32,
) -> Vec<Asset> {
    info!("fetching assets from server");

    let mut catalog = Vec::new();
    let mut page = 1u32;

    loop {
        debug!(page, "fetching page");

        let response = match api.search_page(page_size, page).await {
            Ok(response) => response,
            Err(err) => {
                error!(page, error = %err, "page fetch failed, keeping partial catalog");
                break;
            }
        };

        if response.items.is_empty() {
            debug!(page, "empty page, stopping");
            break;
        }

        let fetched = response.items.len();
        let before = catalog.len();
        catalog.extend(response.items.into_iter().filter(|a| filter.keeps(a)));
        debug!(page, fetched, kept = catalog.len() - before, "page fetched");

        if response.next_page.is_none() {
            info!("all pages fetched");
            break;
        }
        page += 1;
    }

    info!(total = catalog.len(), "catalog assembled");
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str, device_id: Option<&str>) -> Asset {
        Asset {
            id: id.into(),
            original_file_name: format!("{id}.jpg"),
            original_path: None,
            device_id: device_id.map(Into::into),
            checksum: None,
            download_file_name: None,
            integrity: None,
        }
    }

    #[test]
    fn download_filter_excludes_library_imports() {
        let filter = OriginFilter::ExcludeExternal;
        assert!(filter.keeps(&asset("a", Some("iphone-12"))));
        assert!(filter.keeps(&asset("b", None)));
        assert!(!filter.keeps(&asset("c", Some("Library Import"))));
    }

    #[test]
    fn album_filter_keeps_only_library_imports() {
        let filter = OriginFilter::OnlyExternal;
        assert!(!filter.keeps(&asset("a", Some("iphone-12"))));
        assert!(!filter.keeps(&asset("b", None)));
        assert!(filter.keeps(&asset("c", Some("Library Import"))));
    }
}
