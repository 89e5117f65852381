use serde::Deserialize;

/// Listing envelope returned by `/r/{source}.json`.
#[derive(Debug, Deserialize)]
pub struct ListingResponse {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
pub struct ListingChild {
    pub data: PostData,
}

/// The only post field the scraper reads.
#[derive(Debug, Deserialize)]
pub struct PostData {
    /// Link target. Absent or null for some post kinds.
    #[serde(default)]
    pub url: Option<String>,
}

impl ListingResponse {
    /// Link targets of every post, in listing order.
    pub fn urls(self) -> impl Iterator<Item = String> {
        self.data.children.into_iter().filter_map(|child| child.data.url)
    }
}
