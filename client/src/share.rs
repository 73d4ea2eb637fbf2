use sampmap_shared::ShareLink;

/// Link the page was opened with, if its query string carries valid coordinates.
pub fn link_from_location() -> Option<ShareLink> {
    let search = web_sys::window()?.location().search().ok()?;
    ShareLink::from_query(&search)
}

/// Current page URL with the link's parameters set, keeping any other parameters.
pub fn share_url(link: &ShareLink) -> Option<String> {
    let href = web_sys::window()?.location().href().ok()?;
    let url = web_sys::Url::new(&href).ok()?;
    let params = url.search_params();
    for (key, value) in link.query_pairs() {
        params.set(key, &value);
    }
    Some(url.href())
}
