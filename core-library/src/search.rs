//! Substring search over playlists and songs
//!
//! A record matches when any of its searchable fields contains the query.
//! `exact` compares case-sensitively; otherwise both sides are lowercased.
//! Matches keep their input order and an empty query returns the inputs
//! unchanged.

use crate::models::{Playlist, Song};
use serde::{Deserialize, Serialize};

/// Records that expose text fields to the search
pub trait Searchable {
    /// Fields compared against the query
    fn search_fields(&self) -> [&str; 2];
}

impl Searchable for Playlist {
    fn search_fields(&self) -> [&str; 2] {
        [self.name.as_str(), self.description.as_str()]
    }
}

impl Searchable for Song {
    fn search_fields(&self) -> [&str; 2] {
        [self.name.as_str(), self.artist.as_str()]
    }
}

/// Filtered collections returned by [`search`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub playlists: Vec<Playlist>,
    pub songs: Vec<Song>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty() && self.songs.is_empty()
    }
}

/// Whether `needle` occurs in `haystack` under the chosen comparison.
pub fn includes_substring(haystack: &str, needle: &str, exact: bool) -> bool {
    if exact {
        haystack.contains(needle)
    } else {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Whether at least one of `fields` contains `needle`.
pub fn search_in_fields<'a, I>(fields: I, needle: &str, exact: bool) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    fields
        .into_iter()
        .any(|field| includes_substring(field, needle, exact))
}

/// Keeps the items of `items` matching `query`, in order.
pub fn filter_items<T>(items: &[T], query: &str, exact: bool) -> Vec<T>
where
    T: Searchable + Clone,
{
    if query.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| search_in_fields(item.search_fields(), query, exact))
        .cloned()
        .collect()
}

/// Filters both collections with the same query and mode.
pub fn search(query: &str, exact: bool, playlists: &[Playlist], songs: &[Song]) -> SearchResults {
    SearchResults {
        playlists: filter_items(playlists, query, exact),
        songs: filter_items(songs, query, exact),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn songs() -> Vec<Song> {
        vec![
            Song::new(1, "Alpha", "Rock", "X"),
            Song::new(2, "beta", "Pop", "Y"),
            Song::new(3, "Gamma Ray", "Jazz", "Alan Parsons"),
        ]
    }

    fn playlists() -> Vec<Playlist> {
        vec![
            Playlist {
                id: "p1".to_string(),
                name: "Morning".to_string(),
                description: "Calm start".to_string(),
                thumbnail: "assets/img/p1.png".to_string(),
                songs: vec![],
            },
            Playlist {
                id: "p2".to_string(),
                name: "Workout".to_string(),
                description: "ALL the energy".to_string(),
                thumbnail: "assets/img/p2.png".to_string(),
                songs: vec![],
            },
        ]
    }

    #[test]
    fn test_includes_substring_modes() {
        assert!(includes_substring("Alpha", "AL", false));
        assert!(!includes_substring("Alpha", "AL", true));
        assert!(includes_substring("Alpha", "Al", true));
        assert!(includes_substring("anything", "", true));
    }

    #[test]
    fn test_search_in_fields_any_match() {
        assert!(search_in_fields(["no", "match here"], "here", true));
        assert!(!search_in_fields(["no", "match"], "zzz", false));
        assert!(!search_in_fields(Vec::<&str>::new(), "a", false));
    }

    #[test]
    fn test_case_insensitive_example() {
        let songs = vec![
            Song::new(1, "Alpha", "Rock", "X"),
            Song::new(2, "beta", "Pop", "Y"),
        ];

        let results = search("AL", false, &[], &songs);
        assert_eq!(results.songs.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1]);

        let results = search("AL", true, &[], &songs);
        assert!(results.songs.is_empty());
    }

    #[test]
    fn test_song_matches_on_artist() {
        let results = search("parsons", false, &[], &songs());
        assert_eq!(results.songs.len(), 1);
        assert_eq!(results.songs[0].id, 3);
    }

    #[test]
    fn test_song_genre_is_not_searched() {
        assert!(search("Jazz", true, &[], &songs()).songs.is_empty());
    }

    #[test]
    fn test_playlist_matches_on_description() {
        let results = search("all", false, &playlists(), &[]);
        assert_eq!(results.playlists.len(), 1);
        assert_eq!(results.playlists[0].id, "p2");

        assert!(search("all", true, &playlists(), &[]).playlists.is_empty());
    }

    #[test]
    fn test_empty_query_returns_inputs_unchanged() {
        let results = search("", true, &playlists(), &songs());
        assert_eq!(results.playlists, playlists());
        assert_eq!(results.songs, songs());
    }

    #[test]
    fn test_matches_preserve_input_order() {
        let results = search("a", false, &[], &songs());
        let ids: Vec<u32> = results.songs.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let queries = ["", "a", "AL", "al", "ray", "Morning", "energy", "zz", " "];
        for query in queries {
            for exact in [true, false] {
                let once = search(query, exact, &playlists(), &songs());
                let twice = search(query, exact, &once.playlists, &once.songs);
                assert_eq!(once, twice, "query {:?} exact {}", query, exact);
            }
        }
    }
}
