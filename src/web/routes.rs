#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Home,
    CreatePoint,
    Success,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::CreatePoint => "/criar-ponto",
            Page::Success => "/sucesso",
        }
    }

    /// The landing page matches only `/`; the others also match nested paths.
    pub fn from_path(path: &str) -> Option<Page> {
        let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();

        if path == "/" {
            return Some(Page::Home);
        }

        [Page::CreatePoint, Page::Success]
            .into_iter()
            .find(|page| matches_prefix(path, page.path()))
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
