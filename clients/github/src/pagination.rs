use reqwest::header::{HeaderMap, LINK};
use topic_harvest::api::{Error, Result};
use url::Url;

pub(crate) const FIRST_PAGE: u32 = 1;

/// Page numbers advertised by a `Link` header.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LinkPagination {
    pub next_page: Option<u32>,
    pub last_page: Option<u32>,
}

/// Number of the last page, `None` for responses which are not paginated.
pub(crate) fn last_page(headers: &HeaderMap) -> Result<Option<u32>> {
    let header = match headers.get(LINK) {
        Some(header) => header
            .to_str()
            .map_err(|err| Error::Pagination(format!("Link header is not valid text: {}", err)))?,
        None => return Ok(None),
    };
    let links = parse_link_header(header)?;
    Ok(links.last_page.or(links.next_page))
}

/// Parses `<https://api.github.com/...&page=2>; rel="next", <https://api.github.com/...&page=5>; rel="last"`.
pub fn parse_link_header(header: &str) -> Result<LinkPagination> {
    let mut links = LinkPagination::default();
    for entry in header.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let mut segments = entry.split(';').map(str::trim);
        let target = segments
            .next()
            .and_then(|target| target.strip_prefix('<'))
            .and_then(|target| target.strip_suffix('>'))
            .ok_or_else(|| Error::Pagination(format!("Malformed Link entry: {}", entry)))?;
        let rel = segments
            .filter_map(|segment| segment.strip_prefix("rel="))
            .map(|rel| rel.trim_matches('"'))
            .next();
        let slot = match rel {
            Some("next") => &mut links.next_page,
            Some("last") => &mut links.last_page,
            _ => continue,
        };
        *slot = Some(page_number(target)?);
    }
    Ok(links)
}

fn page_number(target: &str) -> Result<u32> {
    let url = Url::parse(target).map_err(|err| Error::Pagination(format!("Invalid Link URL {}: {}", target, err)))?;
    let page = url
        .query_pairs()
        .find(|(key, _)| key == "page")
        .ok_or_else(|| Error::Pagination(format!("No page parameter in {}", target)))?
        .1;
    page.parse()
        .map_err(|err| Error::Pagination(format!("Invalid page {} in {}: {}", page, target, err)))
}

/// `base` with its `page` parameter set to `page`, other query parameters kept in place.
pub(crate) fn page_url(base: &Url, page: u32) -> Url {
    let pairs: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("page", &page.to_string());
    url
}
