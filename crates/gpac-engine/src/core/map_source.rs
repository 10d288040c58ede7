use std::{
    collections::HashMap,
    fs,
    hash::{DefaultHasher, Hash as _, Hasher as _},
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use crate::MapParseError;

use super::game_map::GameMap;

/// The forms a map can be supplied in.
#[derive(Debug, Clone, Default)]
pub enum MapSource {
    /// The built-in 21×21 cross layout.
    #[default]
    Default,
    /// A map file on disk.
    Path(PathBuf),
    /// Map text containing the header and every row.
    Contents(String),
    /// Map text already split into lines.
    Lines(Vec<String>),
    /// An already parsed map, passed through untouched.
    Parsed(GameMap),
}

impl From<GameMap> for MapSource {
    fn from(map: GameMap) -> Self {
        Self::Parsed(map)
    }
}

impl MapSource {
    /// Interprets a string the way a map argument is usually given: text containing a
    /// newline is map contents, anything else is a path. An empty string selects the
    /// default map.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg.is_empty() {
            Self::Default
        } else if arg.contains('\n') {
            Self::Contents(arg.to_owned())
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    /// Parses the source without consulting any cache.
    pub fn parse(&self) -> Result<GameMap, MapParseError> {
        match self {
            Self::Default => Ok(GameMap::default_cross()),
            Self::Path(path) => GameMap::from_file(path),
            Self::Contents(contents) => GameMap::parse_str(contents),
            Self::Lines(lines) => GameMap::parse_lines(lines),
            Self::Parsed(map) => Ok(map.clone()),
        }
    }

    fn cache_key(&self) -> Option<MapKey> {
        let key = match self {
            Self::Default => MapKey::Default,
            // files that cannot be resolved keep their raw path; parsing reports the error
            Self::Path(path) => {
                MapKey::Path(fs::canonicalize(path).unwrap_or_else(|_| path.clone()))
            }
            Self::Contents(contents) => MapKey::Content(content_hash(contents.split('\n'))),
            Self::Lines(lines) => MapKey::Content(content_hash(lines.iter().map(String::as_str))),
            Self::Parsed(_) => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MapKey {
    Default,
    Path(PathBuf),
    Content(u64),
}

fn content_hash<'a, I>(lines: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = DefaultHasher::new();
    for line in lines {
        line.hash(&mut hasher);
    }
    hasher.finish()
}

/// Memoizes parsed maps by source identity.
///
/// Paths are keyed by their canonical form, text sources by a hash of their lines, so
/// `Contents` and `Lines` holding the same rows share one entry. Entries are never
/// invalidated on their own: editing a map file after it was loaded has no effect
/// until [`MapCache::clear`] is called.
///
/// # Example
///
/// ```
/// use gpac_engine::{MapCache, MapSource};
///
/// let cache = MapCache::new();
/// let a = cache.load(&MapSource::Default).unwrap();
/// let b = cache.load(&MapSource::Default).unwrap();
/// assert_eq!(a, b);
/// assert!(a.ptr_eq(&b));
/// ```
#[derive(Debug, Default)]
pub struct MapCache {
    maps: Mutex<HashMap<MapKey, GameMap>>,
}

impl MapCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parsed map for `source`, parsing it on the first request only.
    ///
    /// Failed parses are not cached.
    pub fn load(&self, source: &MapSource) -> Result<GameMap, MapParseError> {
        let Some(key) = source.cache_key() else {
            return source.parse();
        };

        let mut maps = self.maps.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(map) = maps.get(&key) {
            log::trace!("map cache hit: {key:?}");
            return Ok(map.clone());
        }
        log::trace!("map cache miss: {key:?}");
        let map = source.parse()?;
        maps.insert(key, map.clone());
        Ok(map)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached map so the next load re-parses its source.
    pub fn clear(&self) {
        self.maps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use super::*;
    use crate::Position;

    #[test]
    fn test_default_is_memoized() {
        let cache = MapCache::new();
        let a = cache.load(&MapSource::Default).unwrap();
        let b = cache.load(&MapSource::Default).unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_contents_and_lines_share_entry() {
        let cache = MapCache::new();
        let text = "3 2\n.#.\n...";
        let a = cache.load(&MapSource::Contents(text.to_owned())).unwrap();
        let lines = text.split('\n').map(str::to_owned).collect();
        let b = cache.load(&MapSource::Lines(lines)).unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_parsed_passes_through() {
        let cache = MapCache::new();
        let map = GameMap::parse_str("2 2\n#.\n..").unwrap();
        let loaded = cache.load(&MapSource::Parsed(map.clone())).unwrap();
        assert!(loaded.ptr_eq(&map));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_path_not_reparsed_until_clear() {
        let path = env::temp_dir().join(format!("gpac-map-cache-{}.txt", process::id()));
        fs::write(&path, "2 1\n#.").unwrap();

        let cache = MapCache::new();
        let source = MapSource::Path(path.clone());
        let first = cache.load(&source).unwrap();
        assert!(first.is_wall(Position::new(0, 0)));

        fs::write(&path, "2 1\n.#").unwrap();
        let stale = cache.load(&source).unwrap();
        assert!(stale.ptr_eq(&first));

        cache.clear();
        let fresh = cache.load(&source).unwrap();
        assert!(fresh.is_open(Position::new(0, 0)));
        assert!(fresh.is_wall(Position::new(1, 0)));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_equivalent_paths_share_entry() {
        let dir = env::temp_dir();
        let name = format!("gpac-map-alias-{}.txt", process::id());
        let path = dir.join(&name);
        fs::write(&path, "2 1\n.#").unwrap();

        let cache = MapCache::new();
        let a = cache.load(&MapSource::Path(path.clone())).unwrap();
        let b = cache.load(&MapSource::Path(dir.join(".").join(&name))).unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(cache.len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_failed_parse_not_cached() {
        let cache = MapCache::new();
        let source = MapSource::Contents("bad\n".to_owned());
        assert!(cache.load(&source).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_from_arg() {
        assert!(matches!(MapSource::from_arg(""), MapSource::Default));
        assert!(matches!(MapSource::from_arg("maps/a.txt"), MapSource::Path(_)));
        assert!(matches!(
            MapSource::from_arg("1 1\n."),
            MapSource::Contents(_)
        ));
    }
}
