//! Console routes and the auth guard.

use crate::model::Kind;
use crate::pagination;

/// Location within the console, parsed from a path such as `/residents/R1?page=2`. The id
/// segment is percent-encoded in the path form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
    Learn,
    Settings,
    List {
        kind: Kind,
        id: Option<String>,
        page: u32,
    },
    /// Unrecognized path, rendered as "Invalid page".
    Invalid(String),
}

impl Route {
    /// Parse a path with an optional `?query`. Trailing slashes are ignored.
    pub fn parse(path_and_query: &str) -> Self {
        let (path, query) = path_and_query
            .split_once('?')
            .unwrap_or((path_and_query, ""));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["learn"] => Route::Learn,
            ["settings"] => Route::Settings,
            [kind] | [kind, _] => {
                let id = match segments.get(1).map(|s| urlencoding::decode(s)) {
                    Some(Ok(id)) => Some(id.into_owned()),
                    Some(Err(_)) => return Route::Invalid(path.to_string()),
                    None => None,
                };
                match kind.parse::<Kind>() {
                    Ok(kind) => Route::List {
                        kind,
                        id,
                        page: pagination::parse_page(query),
                    },
                    Err(_) => Route::Invalid(path.to_string()),
                }
            }
            _ => Route::Invalid(path.to_string()),
        }
    }

    /// Path form of this route; `page` is emitted only when it is not 1.
    pub fn to_path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Home => "/".to_string(),
            Route::Learn => "/learn".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::List { kind, id, page } => {
                let mut path = format!("/{}", kind);
                if let Some(id) = id {
                    path.push('/');
                    path.push_str(&urlencoding::encode(id));
                }
                if *page != 1 {
                    path.push_str(&format!("?page={}", page));
                }
                path
            }
            Route::Invalid(path) => path.clone(),
        }
    }

    /// Route of a selected item. The page query is dropped.
    pub fn select(kind: Kind, id: &str) -> Self {
        Route::List {
            kind,
            id: Some(id.to_string()),
            page: 1,
        }
    }

    /// Collection list, first page.
    pub fn list(kind: Kind) -> Self {
        Route::List {
            kind,
            id: None,
            page: 1,
        }
    }

    pub fn kind(&self) -> Option<Kind> {
        match self {
            Route::List { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Where a visit to `route` actually lands. Unauthenticated visits to anything but the
/// login page go to `/login`; an authenticated visit to `/login` goes home.
pub fn guard(route: Route, authenticated: bool) -> Route {
    match (route, authenticated) {
        (Route::Login, true) => Route::Home,
        (Route::Login, false) => Route::Login,
        (_, false) => Route::Login,
        (route, true) => route,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_static_pages() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/learn/"), Route::Learn);
        assert_eq!(Route::parse("/settings"), Route::Settings);
    }

    #[test]
    fn parses_list_and_detail() {
        assert_eq!(
            Route::parse("/residents/R1"),
            Route::List {
                kind: Kind::Residents,
                id: Some("R1".to_string()),
                page: 1
            }
        );
        assert_eq!(
            Route::parse("/models?page=3"),
            Route::List {
                kind: Kind::Models,
                id: None,
                page: 3
            }
        );
    }

    #[test]
    fn unknown_paths_are_invalid() {
        assert_eq!(Route::parse("/users"), Route::Invalid("/users".to_string()));
        assert_eq!(
            Route::parse("/groups/G1/extra"),
            Route::Invalid("/groups/G1/extra".to_string())
        );
    }

    #[test]
    fn to_path_omits_first_page() {
        assert_eq!(Route::list(Kind::Groups).to_path(), "/groups");
        let paged = Route::List {
            kind: Kind::Groups,
            id: None,
            page: 2,
        };
        assert_eq!(paged.to_path(), "/groups?page=2");
        assert_eq!(Route::parse(&paged.to_path()), paged);
    }

    #[test]
    fn selecting_an_item_routes_to_its_detail() {
        assert_eq!(Route::select(Kind::Residents, "R1").to_path(), "/residents/R1");
    }

    #[test]
    fn reserved_characters_in_ids_round_trip() {
        let model = Route::select(Kind::Models, "Qwen/Qwen2.5-7B");
        assert_eq!(model.to_path(), "/models/Qwen%2FQwen2.5-7B");
        assert_eq!(Route::parse(&model.to_path()), model);

        let odd = Route::List {
            kind: Kind::Groups,
            id: Some("a?b#c d".to_string()),
            page: 3,
        };
        assert_eq!(Route::parse(&odd.to_path()), odd);
        assert_eq!(
            Route::parse("/groups/%FF"),
            Route::Invalid("/groups/%FF".to_string())
        );
    }

    #[test]
    fn guard_redirects_by_default() {
        for path in ["/", "/learn", "/settings", "/residents", "/groups/G1", "/nope"] {
            assert_eq!(guard(Route::parse(path), false), Route::Login, "{}", path);
        }
        assert_eq!(guard(Route::Login, false), Route::Login);
        assert_eq!(guard(Route::Login, true), Route::Home);
        assert_eq!(guard(Route::Learn, true), Route::Learn);
    }
}
