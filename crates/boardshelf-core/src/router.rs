//! URL-to-view routing for the catalog.
//!
//! The table is an ordered list of `(pattern, name)` pairs. A request is
//! checked against each pattern in turn; the first match wins and its
//! captures are turned into typed route parameters. Anything left over is
//! reported as [`Resolution::Unmatched`] instead of falling through.

use std::borrow::Cow;
use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use url::form_urlencoded;

use crate::game::GameId;

/// Referrer used when a detail URL carries no (or an empty) `from` parameter.
pub const DEFAULT_REFERRER: &str = "home";

/// Query parameter carrying the referrer tag.
pub const REFERRER_QUERY_KEY: &str = "from";

/// Path parameter holding the game id in the detail pattern.
const ID_PARAM: &str = "id";

/// Characters escaped when writing a parameter into a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Identifier of a routed view. The discriminant is the route's position in
/// the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Home = 0,
    GameDetail = 1,
}

impl RouteName {
    /// Every route, in match order.
    pub const ALL: [RouteName; 2] = [RouteName::Home, RouteName::GameDetail];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::GameDetail => "game-detail",
        }
    }

    /// Path pattern this route is mounted on.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::GameDetail => "/game/{id}",
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A game id taken from a URL path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdParam {
    Valid(GameId),
    /// The raw segment, which did not parse as an integer.
    Invalid(String),
}

impl IdParam {
    pub fn parse(segment: &str) -> Self {
        match segment.parse::<GameId>() {
            Ok(id) => Self::Valid(id),
            Err(_) => Self::Invalid(segment.to_string()),
        }
    }

    pub fn game_id(&self) -> Option<GameId> {
        match self {
            Self::Valid(id) => Some(*id),
            Self::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

impl fmt::Display for IdParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(id) => write!(f, "{id}"),
            Self::Invalid(raw) => f.write_str(raw),
        }
    }
}

/// Parameters extracted for the game detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailParams {
    pub id: IdParam,
    pub referrer: String,
}

/// A resolved route with its typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    GameDetail(DetailParams),
}

impl Route {
    /// Detail route for `id`. An empty referrer is replaced by the default.
    pub fn game_detail(id: GameId, referrer: &str) -> Self {
        Self::GameDetail(DetailParams {
            id: IdParam::Valid(id),
            referrer: normalize_referrer(referrer),
        })
    }

    pub fn name(&self) -> RouteName {
        match self {
            Self::Home => RouteName::Home,
            Self::GameDetail(_) => RouteName::GameDetail,
        }
    }
}

/// Outcome of resolving a request against the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(Route),
    Unmatched { path: String },
}

impl Resolution {
    pub fn route(&self) -> Option<&Route> {
        match self {
            Self::Matched(route) => Some(route),
            Self::Unmatched { .. } => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Param(&'static str),
}

/// A path pattern such as `/game/{id}`.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: &'static str,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern. `{name}` segments capture, everything else is literal.
    pub fn parse(source: &'static str) -> Self {
        let segments = split_segments(source)
            .into_iter()
            .map(|seg| match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name),
                None => Segment::Literal(seg),
            })
            .collect();
        Self { source, segments }
    }

    pub fn as_str(&self) -> &'static str {
        self.source
    }

    /// Match already-split path segments, returning the percent-decoded
    /// captures on success.
    fn captures<'p>(&self, path: &[&'p str]) -> Option<Vec<(&'static str, Cow<'p, str>)>> {
        if path.len() != self.segments.len() {
            return None;
        }
        let mut captures = Vec::new();
        for (pattern, actual) in self.segments.iter().zip(path) {
            match pattern {
                Segment::Literal(lit) => {
                    if !actual.eq_ignore_ascii_case(lit) {
                        return None;
                    }
                },
                Segment::Param(name) => {
                    if actual.is_empty() {
                        return None;
                    }
                    captures.push((*name, decode_segment(actual)));
                },
            }
        }
        Some(captures)
    }

    /// Build a path from this pattern, filling params by name. Values are
    /// percent-encoded.
    fn fill(&self, params: &[(&str, String)]) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(lit) => path.push_str(lit),
                Segment::Param(name) => {
                    if let Some((_, value)) = params.iter().find(|(k, _)| k == name) {
                        path.extend(utf8_percent_encode(value, SEGMENT));
                    }
                },
            }
        }
        path
    }
}

/// The catalog's navigation table.
#[derive(Debug, Clone)]
pub struct Router {
    base: String,
    table: [(RoutePattern, RouteName); 2],
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Default table mounted at `/`.
    pub fn new() -> Self {
        Self::with_base("/")
    }

    /// Default table mounted under `base` (e.g. `/catalog`).
    pub fn with_base(base: &str) -> Self {
        Self {
            base: normalize_base(base),
            table: RouteName::ALL.map(|name| (RoutePattern::parse(name.pattern()), name)),
        }
    }

    /// Mount point, without a trailing slash (`""` for the root).
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The routing table in match order.
    pub fn routes(&self) -> impl Iterator<Item = (&'static str, RouteName)> + '_ {
        self.table
            .iter()
            .map(|(pattern, name)| (pattern.as_str(), *name))
    }

    /// Resolve a path and an optional raw query string (with or without the
    /// leading `?`).
    pub fn resolve(&self, path: &str, query: Option<&str>) -> Resolution {
        let unmatched = || Resolution::Unmatched {
            path: path.to_string(),
        };

        let Some(relative) = self.strip_base(path) else {
            tracing::debug!(path, base = %self.base, "Path outside router base");
            return unmatched();
        };
        let segments = split_segments(relative);

        for (pattern, name) in &self.table {
            if let Some(captures) = pattern.captures(&segments) {
                let route = build_route(*name, &captures, query);
                tracing::debug!(path, route = %name, "Resolved route");
                return Resolution::Matched(route);
            }
        }

        tracing::debug!(path, "No route matched");
        unmatched()
    }

    /// Resolve a request target such as `/game/42?from=search#top`, or an
    /// absolute URL. The fragment is ignored.
    pub fn resolve_url(&self, url: &str) -> Resolution {
        if !url.starts_with('/')
            && let Ok(parsed) = url::Url::parse(url)
        {
            return self.resolve(parsed.path(), parsed.query());
        }

        let target = url.split_once('#').map_or(url, |(before, _)| before);
        match target.split_once('?') {
            Some((path, query)) => self.resolve(path, Some(query)),
            None => self.resolve(target, None),
        }
    }

    /// Build the URL for `route`, including the base path.
    pub fn href(&self, route: &Route) -> String {
        let (pattern, _) = &self.table[route.name() as usize];
        match route {
            Route::Home => self.with_base_prefix(&pattern.fill(&[])),
            Route::GameDetail(params) => {
                let path = pattern.fill(&[(ID_PARAM, params.id.to_string())]);
                let mut href = self.with_base_prefix(&path);
                if params.referrer != DEFAULT_REFERRER {
                    href.push('?');
                    href.push_str(
                        &form_urlencoded::Serializer::new(String::new())
                            .append_pair(REFERRER_QUERY_KEY, &params.referrer)
                            .finish(),
                    );
                }
                href
            },
        }
    }

    /// Strip the base path, returning the remainder as an absolute path.
    fn strip_base<'p>(&self, path: &'p str) -> Option<&'p str> {
        if self.base.is_empty() {
            return Some(path);
        }
        let rest = path.strip_prefix(self.base.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    fn with_base_prefix(&self, path: &str) -> String {
        if self.base.is_empty() {
            path.to_string()
        } else if path == "/" {
            self.base.clone()
        } else {
            format!("{}{path}", self.base)
        }
    }
}

fn build_route(name: RouteName, captures: &[(&str, Cow<'_, str>)], query: Option<&str>) -> Route {
    match name {
        RouteName::Home => Route::Home,
        RouteName::GameDetail => {
            let raw_id = captures
                .iter()
                .find(|(key, _)| *key == ID_PARAM)
                .map_or("", |(_, value)| value.as_ref());
            Route::GameDetail(DetailParams {
                id: IdParam::parse(raw_id),
                referrer: referrer_from_query(query),
            })
        },
    }
}

/// Percent-decode a path segment. Bytes that do not decode to UTF-8 leave
/// the segment as written.
fn decode_segment(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(segment))
}

/// First `from` value in the query, or the default when absent or empty.
fn referrer_from_query(query: Option<&str>) -> String {
    let Some(query) = query else {
        return DEFAULT_REFERRER.to_string();
    };
    let query = query.strip_prefix('?').unwrap_or(query);
    let value = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == REFERRER_QUERY_KEY)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();
    normalize_referrer(&value)
}

fn normalize_referrer(referrer: &str) -> String {
    if referrer.is_empty() {
        DEFAULT_REFERRER.to_string()
    } else {
        referrer.to_string()
    }
}

/// `"/catalog/"` -> `"/catalog"`, `"catalog"` -> `"/catalog"`, `"/"` -> `""`.
fn normalize_base(base: &str) -> String {
    let trimmed = base.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Split an absolute path into segments. The root is zero segments and a
/// single trailing slash is ignored; an empty path counts as the root.
fn split_segments(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(resolution: &Resolution) -> &DetailParams {
        match resolution {
            Resolution::Matched(Route::GameDetail(params)) => params,
            other => panic!("expected game detail, got {other:?}"),
        }
    }

    #[test]
    fn root_resolves_to_home() {
        let router = Router::new();
        let res = router.resolve("/", None);
        assert_eq!(res, Resolution::Matched(Route::Home));
        assert_eq!(res.route().unwrap().name().as_str(), "home");
    }

    #[test]
    fn empty_path_resolves_to_home() {
        assert_eq!(Router::new().resolve("", None), Resolution::Matched(Route::Home));
    }

    #[test]
    fn detail_without_query_uses_default_referrer() {
        let res = Router::new().resolve("/game/42", None);
        let params = detail(&res);
        assert_eq!(params.id, IdParam::Valid(GameId(42)));
        assert_eq!(params.referrer, "home");
        assert_eq!(res.route().unwrap().name().as_str(), "game-detail");
    }

    #[test]
    fn detail_reads_from_query() {
        let res = Router::new().resolve("/game/42", Some("from=search"));
        let params = detail(&res);
        assert_eq!(params.id, IdParam::Valid(GameId(42)));
        assert_eq!(params.referrer, "search");
    }

    #[test]
    fn query_with_leading_question_mark() {
        let res = Router::new().resolve("/game/1", Some("?from=favourites"));
        assert_eq!(detail(&res).referrer, "favourites");
    }

    #[test]
    fn empty_from_falls_back_to_default() {
        let res = Router::new().resolve("/game/1", Some("from="));
        assert_eq!(detail(&res).referrer, DEFAULT_REFERRER);
    }

    #[test]
    fn first_from_value_wins() {
        let res = Router::new().resolve("/game/1", Some("from=a&from=b"));
        assert_eq!(detail(&res).referrer, "a");
    }

    #[test]
    fn referrer_is_form_decoded() {
        let res = Router::new().resolve("/game/1", Some("sort=name&from=my+list%21"));
        assert_eq!(detail(&res).referrer, "my list!");
    }

    #[test]
    fn non_integer_id_is_invalid_not_an_error() {
        let res = Router::new().resolve("/game/abc", None);
        let params = detail(&res);
        assert_eq!(params.id, IdParam::Invalid("abc".to_string()));
        assert!(!params.id.is_valid());
        assert_eq!(params.id.game_id(), None);
        assert_eq!(params.referrer, "home");
    }

    #[test]
    fn fractional_id_is_invalid() {
        let res = Router::new().resolve("/game/4.2", None);
        assert_eq!(detail(&res).id, IdParam::Invalid("4.2".to_string()));
    }

    #[test]
    fn negative_id_is_valid_integer() {
        let res = Router::new().resolve("/game/-1", None);
        assert_eq!(detail(&res).id, IdParam::Valid(GameId(-1)));
    }

    #[test]
    fn unknown_path_is_unmatched() {
        let res = Router::new().resolve("/nonexistent", None);
        assert_eq!(
            res,
            Resolution::Unmatched {
                path: "/nonexistent".to_string()
            }
        );
        assert!(!res.is_matched());
        assert!(res.route().is_none());
    }

    #[test]
    fn missing_id_segment_is_unmatched() {
        assert!(!Router::new().resolve("/game/", None).is_matched());
        assert!(!Router::new().resolve("/game", None).is_matched());
        assert!(!Router::new().resolve("/game//", None).is_matched());
    }

    #[test]
    fn extra_segments_are_unmatched() {
        assert!(!Router::new().resolve("/game/1/reviews", None).is_matched());
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let res = Router::new().resolve("/game/42/", None);
        assert_eq!(detail(&res).id, IdParam::Valid(GameId(42)));
    }

    #[test]
    fn static_segments_are_case_insensitive() {
        let res = Router::new().resolve("/GAME/42", None);
        assert_eq!(detail(&res).id, IdParam::Valid(GameId(42)));
    }

    #[test]
    fn resolve_url_splits_query_and_drops_fragment() {
        let router = Router::new();
        let res = router.resolve_url("/game/42?from=search#rules");
        let params = detail(&res);
        assert_eq!(params.id, IdParam::Valid(GameId(42)));
        assert_eq!(params.referrer, "search");

        let res = router.resolve_url("/game/7#from=nowhere");
        assert_eq!(detail(&res).referrer, "home");
    }

    #[test]
    fn resolve_url_accepts_absolute_urls() {
        let res = Router::new().resolve_url("https://example.com/game/3?from=share");
        let params = detail(&res);
        assert_eq!(params.id, IdParam::Valid(GameId(3)));
        assert_eq!(params.referrer, "share");
    }

    #[test]
    fn resolve_url_keeps_urls_inside_the_query() {
        let router = Router::new();
        let res = router.resolve_url("/game/1?from=https://example.com");
        let params = detail(&res);
        assert_eq!(params.id, IdParam::Valid(GameId(1)));
        assert_eq!(params.referrer, "https://example.com");

        let res = router.resolve_url("/?next=http://partner.site/list");
        assert_eq!(res, Resolution::Matched(Route::Home));
    }

    #[test]
    fn resolve_url_relative_without_leading_slash() {
        let res = Router::new().resolve_url("game/8?from=list");
        let params = detail(&res);
        assert_eq!(params.id, IdParam::Valid(GameId(8)));
        assert_eq!(params.referrer, "list");
    }

    #[test]
    fn path_params_are_percent_decoded() {
        let router = Router::new();
        let res = router.resolve("/game/%34%32", None);
        assert_eq!(detail(&res).id, IdParam::Valid(GameId(42)));

        let res = router.resolve("/game/%61bc", None);
        assert_eq!(detail(&res).id, IdParam::Invalid("abc".to_string()));

        let res = router.resolve_url("/game/a%3Fb%23c");
        assert_eq!(detail(&res).id, IdParam::Invalid("a?b#c".to_string()));
    }

    #[test]
    fn undecodable_path_param_is_kept_as_written() {
        let res = Router::new().resolve("/game/%FF", None);
        assert_eq!(detail(&res).id, IdParam::Invalid("%FF".to_string()));
    }

    #[test]
    fn href_encodes_invalid_segments() {
        let router = Router::new();
        let route = Route::GameDetail(DetailParams {
            id: IdParam::Invalid("a%b#c?d".to_string()),
            referrer: DEFAULT_REFERRER.to_string(),
        });
        let href = router.href(&route);
        assert_eq!(href, "/game/a%25b%23c%3Fd");
        assert_eq!(router.resolve_url(&href), Resolution::Matched(route));
    }

    #[test]
    fn every_route_name_has_its_own_table_entry() {
        let router = Router::new();
        for name in RouteName::ALL {
            let (pattern, entry) = &router.table[name as usize];
            assert_eq!(*entry, name);
            assert_eq!(pattern.as_str(), name.pattern());
        }
        assert_eq!(router.routes().count(), RouteName::ALL.len());
    }

    #[test]
    fn base_path_is_stripped() {
        let router = Router::with_base("/catalog/");
        assert_eq!(router.base(), "/catalog");
        assert_eq!(router.resolve("/catalog", None), Resolution::Matched(Route::Home));
        assert_eq!(router.resolve("/catalog/", None), Resolution::Matched(Route::Home));
        let res = router.resolve("/catalog/game/5", None);
        assert_eq!(detail(&res).id, IdParam::Valid(GameId(5)));
    }

    #[test]
    fn paths_outside_base_are_unmatched() {
        let router = Router::with_base("/catalog");
        assert!(!router.resolve("/", None).is_matched());
        assert!(!router.resolve("/game/5", None).is_matched());
        assert!(!router.resolve("/catalogue/game/5", None).is_matched());
    }

    #[test]
    fn href_for_home() {
        assert_eq!(Router::new().href(&Route::Home), "/");
        assert_eq!(Router::with_base("/catalog").href(&Route::Home), "/catalog");
    }

    #[test]
    fn href_for_detail() {
        let router = Router::new();
        assert_eq!(router.href(&Route::game_detail(GameId(42), "home")), "/game/42");
        assert_eq!(
            router.href(&Route::game_detail(GameId(42), "search")),
            "/game/42?from=search"
        );
        assert_eq!(
            router.href(&Route::game_detail(GameId(1), "my list")),
            "/game/1?from=my+list"
        );
        assert_eq!(
            Router::with_base("/catalog").href(&Route::game_detail(GameId(9), "")),
            "/catalog/game/9"
        );
    }

    #[test]
    fn routes_are_listed_in_match_order() {
        let routes: Vec<_> = Router::new().routes().collect();
        assert_eq!(
            routes,
            vec![("/", RouteName::Home), ("/game/{id}", RouteName::GameDetail)]
        );
    }

    #[test]
    fn route_name_display() {
        assert_eq!(RouteName::Home.to_string(), "home");
        assert_eq!(RouteName::GameDetail.to_string(), "game-detail");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn href_resolves_back_to_the_same_route(
                id in any::<i64>(),
                referrer in ".{0,24}",
            ) {
                let router = Router::new();
                let route = Route::game_detail(GameId(id), &referrer);
                let href = router.href(&route);
                prop_assert_eq!(router.resolve_url(&href), Resolution::Matched(route));
            }

            #[test]
            fn href_roundtrip_under_base(id in any::<i64>(), base in "[a-z]{1,8}") {
                let router = Router::with_base(&base);
                let route = Route::game_detail(GameId(id), "search");
                prop_assert_eq!(router.resolve_url(&router.href(&route)), Resolution::Matched(route));
            }

            #[test]
            fn invalid_segments_survive_href(raw in "\\PC{1,16}", referrer in ".{0,12}") {
                prop_assume!(raw.parse::<GameId>().is_err());
                let router = Router::new();
                let route = Route::GameDetail(DetailParams {
                    id: IdParam::Invalid(raw),
                    referrer: normalize_referrer(&referrer),
                });
                prop_assert_eq!(router.resolve_url(&router.href(&route)), Resolution::Matched(route));
            }

            #[test]
            fn non_numeric_segments_resolve_to_invalid(segment in "[a-zA-Z_][a-zA-Z0-9_.]{0,12}") {
                let res = Router::new().resolve(&format!("/game/{segment}"), None);
                let expected = Resolution::Matched(Route::GameDetail(DetailParams {
                    id: IdParam::Invalid(segment.clone()),
                    referrer: DEFAULT_REFERRER.to_string(),
                }));
                prop_assert_eq!(res, expected);
            }

            #[test]
            fn resolve_never_panics(path in "\\PC{0,40}", query in proptest::option::of("\\PC{0,40}")) {
                let _ = Router::new().resolve(&path, query.as_deref());
                let _ = Router::new().resolve_url(&path);
            }
        }
    }
}
