//! Trait definitions for provider adapters and the catalog store.
//!
//! These traits are the seams between the orchestration code (aggregator,
//! import pipeline) and the outside world. Production code uses the real
//! adapters and the SQLite store, while tests substitute the mocks below.
//!
//! # Example
//!
//! ```ignore
//! use music_catalog::catalog::traits::MusicProvider;
//!
//! async fn first_album<P: MusicProvider + ?Sized>(provider: &P) -> Option<Album> {
//!     provider.search_albums("boards of canada", 1).await.ok()?.into_iter().next()
//! }
//! ```

use async_trait::async_trait;

use super::domain::{Album, Artist, CatalogError, ProviderId, SearchResults, Track};
use crate::model::{AlbumRefresh, LocalAlbum, NewAlbum, NewSong};

/// Uniform capability interface over one external metadata provider.
///
/// Adapters own their credential lifecycle; callers never see tokens.
/// No ordering guarantee is made on returned lists beyond the provider's own.
#[async_trait]
pub trait MusicProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    async fn search_artists(&self, query: &str, limit: usize)
    -> Result<Vec<Artist>, CatalogError>;

    async fn search_albums(&self, query: &str, limit: usize) -> Result<Vec<Album>, CatalogError>;

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>, CatalogError>;

    /// Combined search across all three sections.
    ///
    /// The default runs the typed searches concurrently and fails if any of
    /// them fails. Adapters with a combined endpoint override this.
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, CatalogError> {
        let (artists, albums, tracks) = tokio::try_join!(
            self.search_artists(query, limit),
            self.search_albums(query, limit),
            self.search_tracks(query, limit),
        )?;
        Ok(SearchResults {
            artists,
            albums,
            tracks,
            ..Default::default()
        })
    }

    async fn get_artist(&self, id: &str) -> Result<Artist, CatalogError>;

    /// Full album detail plus its track list.
    async fn get_album(&self, id: &str) -> Result<(Album, Vec<Track>), CatalogError>;

    async fn get_track(&self, id: &str) -> Result<Track, CatalogError>;

    /// Extended capability: listing an artist's discography.
    ///
    /// Providers that support it return `Some(self)`.
    fn discography(&self) -> Option<&dyn ArtistDiscography> {
        None
    }
}

/// Optional capability for providers that can list every album by an artist.
#[async_trait]
pub trait ArtistDiscography: Send + Sync {
    async fn artist_albums(
        &self,
        artist_id: &str,
        limit: usize,
    ) -> Result<Vec<Album>, CatalogError>;
}

/// Persistence boundary consumed by search and import.
///
/// Every method maps storage failures to [`CatalogError::Persistence`], except
/// [`CatalogStore::user_id_by_token`] which reports unknown tokens as
/// [`CatalogError::Authorization`].
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Resolve a bearer token to the owning user id.
    async fn user_id_by_token(&self, token: &str) -> Result<i64, CatalogError>;

    /// Look up a local album by its exact (user, artist, title) identity.
    async fn find_album(
        &self,
        user_id: i64,
        artist: &str,
        title: &str,
    ) -> Result<Option<LocalAlbum>, CatalogError>;

    async fn insert_album(&self, album: &NewAlbum) -> Result<i64, CatalogError>;

    async fn refresh_album(&self, album_id: i64, refresh: &AlbumRefresh)
    -> Result<(), CatalogError>;

    async fn song_exists(
        &self,
        album_id: i64,
        title: &str,
        artist: &str,
    ) -> Result<bool, CatalogError>;

    async fn insert_song(&self, song: &NewSong) -> Result<i64, CatalogError>;

    async fn find_artist_by_name(&self, name: &str) -> Result<Option<i64>, CatalogError>;

    async fn insert_artist(&self, artist: &Artist) -> Result<i64, CatalogError>;

    async fn update_artist(&self, id: i64, artist: &Artist) -> Result<(), CatalogError>;

    /// Insert or refresh an artist keyed on its exact display name.
    async fn upsert_artist_by_name(&self, artist: &Artist) -> Result<i64, CatalogError> {
        match self.find_artist_by_name(&artist.name).await? {
            Some(id) => {
                self.update_artist(id, artist).await?;
                Ok(id)
            }
            None => self.insert_artist(artist).await,
        }
    }
}

/// Mock provider and in-memory store for tests.
#[cfg(test)]
pub mod mocks {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;

    /// Build a minimal artist for `provider`.
    pub fn artist(provider: ProviderId, name: &str) -> Artist {
        Artist {
            external_id: format!("{}-{}", provider, name.to_lowercase().replace(' ', "-")),
            name: name.to_string(),
            provider,
            image_url: None,
            biography: None,
            genres: vec![],
            popularity: None,
            external_url: None,
        }
    }

    /// Build a minimal album for `provider`.
    pub fn album(provider: ProviderId, id: &str, artist: &str, title: &str) -> Album {
        Album {
            external_id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            artist_external_id: None,
            provider,
            release_year: None,
            release_date: None,
            genre: None,
            cover_url: None,
            track_count: None,
            external_url: None,
        }
    }

    /// Build a minimal track for `provider`.
    pub fn track(provider: ProviderId, title: &str, artist: &str) -> Track {
        Track {
            external_id: format!("{}-{}", provider, title.to_lowercase().replace(' ', "-")),
            title: title.to_string(),
            artist: artist.to_string(),
            artist_external_id: None,
            album: None,
            album_external_id: None,
            provider,
            duration_seconds: 200,
            track_number: None,
            disc_number: None,
            isrc: None,
            external_url: None,
            preview_url: None,
        }
    }

    /// Mock provider that returns predefined results.
    pub struct MockProvider {
        id: ProviderId,
        /// Results to return from the search methods
        pub results: SearchResults,
        /// Error to return from every call (takes precedence over results)
        pub error: Option<CatalogError>,
        /// Artificial latency added to every call
        pub delay: Option<Duration>,
        /// Panic instead of answering
        pub panics: bool,
        albums: Mutex<HashMap<String, (Album, Vec<Track>)>>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        /// Create a mock that returns no matches.
        pub fn empty(id: ProviderId) -> Self {
            Self {
                id,
                results: SearchResults::default(),
                error: None,
                delay: None,
                panics: false,
                albums: Mutex::new(HashMap::new()),
                calls: AtomicUsize::new(0),
            }
        }

        /// Create a mock whose searches return one artist, album and track.
        pub fn with_hits(id: ProviderId, artist_name: &str) -> Self {
            let mut mock = Self::empty(id);
            mock.results = SearchResults {
                artists: vec![artist(id, artist_name)],
                albums: vec![album(id, &format!("{}-album", id), artist_name, "Album")],
                tracks: vec![track(id, "Track", artist_name)],
                ..Default::default()
            };
            mock
        }

        /// Create a mock whose every call fails.
        pub fn with_error(id: ProviderId, error: CatalogError) -> Self {
            let mut mock = Self::empty(id);
            mock.error = Some(error);
            mock
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn panicking(mut self) -> Self {
            self.panics = true;
            self
        }

        /// Register (or replace) the detail returned by `get_album`.
        pub fn set_album(&self, album: Album, tracks: Vec<Track>) {
            self.albums
                .lock()
                .insert(album.external_id.clone(), (album, tracks));
        }

        /// Number of calls made to this provider.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn enter(&self) -> Result<(), CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.panics {
                panic!("{} mock panicked", self.id);
            }
            match self.error {
                Some(ref err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl MusicProvider for MockProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn search_artists(
            &self,
            _query: &str,
            limit: usize,
        ) -> Result<Vec<Artist>, CatalogError> {
            self.enter().await?;
            Ok(self.results.artists.iter().take(limit).cloned().collect())
        }

        async fn search_albums(&self, _query: &str, limit: usize) -> Result<Vec<Album>, CatalogError> {
            self.enter().await?;
            Ok(self.results.albums.iter().take(limit).cloned().collect())
        }

        async fn search_tracks(&self, _query: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
            self.enter().await?;
            Ok(self.results.tracks.iter().take(limit).cloned().collect())
        }

        async fn search(&self, _query: &str, limit: usize) -> Result<SearchResults, CatalogError> {
            self.enter().await?;
            Ok(SearchResults {
                artists: self.results.artists.iter().take(limit).cloned().collect(),
                albums: self.results.albums.iter().take(limit).cloned().collect(),
                tracks: self.results.tracks.iter().take(limit).cloned().collect(),
                ..Default::default()
            })
        }

        async fn get_artist(&self, id: &str) -> Result<Artist, CatalogError> {
            self.enter().await?;
            self.results
                .artists
                .iter()
                .find(|a| a.external_id == id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(format!("artist {}", id)))
        }

        async fn get_album(&self, id: &str) -> Result<(Album, Vec<Track>), CatalogError> {
            self.enter().await?;
            self.albums
                .lock()
                .get(id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(format!("album {}", id)))
        }

        async fn get_track(&self, id: &str) -> Result<Track, CatalogError> {
            self.enter().await?;
            self.results
                .tracks
                .iter()
                .find(|t| t.external_id == id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(format!("track {}", id)))
        }
    }

    #[derive(Default)]
    struct MemoryState {
        sessions: HashMap<String, i64>,
        albums: Vec<LocalAlbum>,
        songs: Vec<NewSong>,
        artists: Vec<(i64, Artist)>,
    }

    /// In-memory [`CatalogStore`] with failure injection.
    #[derive(Default)]
    pub struct MemoryStore {
        state: Mutex<MemoryState>,
        /// Song titles whose insert fails
        failing_songs: Vec<String>,
        /// Make every album write fail
        fail_album_writes: bool,
        lookups: AtomicUsize,
    }

    impl MemoryStore {
        /// Create a store with one user reachable through `token`.
        pub fn with_session(token: &str, user_id: i64) -> Self {
            let store = Self::default();
            store.state.lock().sessions.insert(token.to_string(), user_id);
            store
        }

        /// Make inserting a song titled `title` fail.
        pub fn failing_song(mut self, title: &str) -> Self {
            self.failing_songs.push(title.to_string());
            self
        }

        /// Make every album insert/refresh fail.
        pub fn failing_album_writes(mut self) -> Self {
            self.fail_album_writes = true;
            self
        }

        pub fn albums(&self) -> Vec<LocalAlbum> {
            self.state.lock().albums.clone()
        }

        pub fn songs(&self) -> Vec<NewSong> {
            self.state.lock().songs.clone()
        }

        pub fn artists(&self) -> Vec<(i64, Artist)> {
            self.state.lock().artists.clone()
        }

        /// Number of token lookups performed.
        pub fn token_lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogStore for MemoryStore {
        async fn user_id_by_token(&self, token: &str) -> Result<i64, CatalogError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.state
                .lock()
                .sessions
                .get(token)
                .copied()
                .ok_or_else(|| CatalogError::Authorization("invalid token".to_string()))
        }

        async fn find_album(
            &self,
            user_id: i64,
            artist: &str,
            title: &str,
        ) -> Result<Option<LocalAlbum>, CatalogError> {
            Ok(self
                .state
                .lock()
                .albums
                .iter()
                .find(|a| a.user_id == user_id && a.artist == artist && a.title == title)
                .cloned())
        }

        async fn insert_album(&self, album: &NewAlbum) -> Result<i64, CatalogError> {
            if self.fail_album_writes {
                return Err(CatalogError::persistence("album write rejected"));
            }
            let mut state = self.state.lock();
            let id = state.albums.len() as i64 + 1;
            state.albums.push(LocalAlbum {
                id,
                user_id: album.user_id,
                title: album.title.clone(),
                artist: album.artist.clone(),
                release_year: album.release_year,
                genres: album.genres.clone(),
                tracks: album.tracks.clone(),
                rating: album.rating,
                cover_url: album.cover_url.clone(),
                provider: Some(album.provider.clone()),
                external_id: Some(album.external_id.clone()),
            });
            Ok(id)
        }

        async fn refresh_album(
            &self,
            album_id: i64,
            refresh: &AlbumRefresh,
        ) -> Result<(), CatalogError> {
            if self.fail_album_writes {
                return Err(CatalogError::persistence("album write rejected"));
            }
            let mut state = self.state.lock();
            let album = state
                .albums
                .iter_mut()
                .find(|a| a.id == album_id)
                .ok_or_else(|| CatalogError::persistence("no such album"))?;
            album.release_year = refresh.release_year;
            album.genres = refresh.genres.clone();
            album.tracks = refresh.tracks.clone();
            if refresh.cover_url.is_some() {
                album.cover_url = refresh.cover_url.clone();
            }
            Ok(())
        }

        async fn song_exists(
            &self,
            album_id: i64,
            title: &str,
            artist: &str,
        ) -> Result<bool, CatalogError> {
            Ok(self
                .state
                .lock()
                .songs
                .iter()
                .any(|s| s.album_id == album_id && s.title == title && s.artist == artist))
        }

        async fn insert_song(&self, song: &NewSong) -> Result<i64, CatalogError> {
            if self.failing_songs.contains(&song.title) {
                return Err(CatalogError::persistence(format!(
                    "song '{}' rejected",
                    song.title
                )));
            }
            let mut state = self.state.lock();
            state.songs.push(song.clone());
            Ok(state.songs.len() as i64)
        }

        async fn find_artist_by_name(&self, name: &str) -> Result<Option<i64>, CatalogError> {
            Ok(self
                .state
                .lock()
                .artists
                .iter()
                .find(|(_, a)| a.name == name)
                .map(|(id, _)| *id))
        }

        async fn insert_artist(&self, artist: &Artist) -> Result<i64, CatalogError> {
            let mut state = self.state.lock();
            let id = state.artists.len() as i64 + 1;
            state.artists.push((id, artist.clone()));
            Ok(id)
        }

        async fn update_artist(&self, id: i64, artist: &Artist) -> Result<(), CatalogError> {
            let mut state = self.state.lock();
            if let Some(entry) = state.artists.iter_mut().find(|(i, _)| *i == id) {
                entry.1 = artist.clone();
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_counts_calls() {
            let mock = MockProvider::with_hits(ProviderId::Spotify, "Boards of Canada");
            let results = mock.search("boc", 10).await.unwrap();
            assert_eq!(results.artists.len(), 1);
            assert_eq!(mock.calls(), 1);
        }

        #[tokio::test]
        async fn test_mock_provider_error() {
            let mock = MockProvider::with_error(
                ProviderId::AppleMusic,
                CatalogError::Network("timeout".to_string()),
            );
            let result = mock.search_artists("boc", 10).await;
            assert!(matches!(result, Err(CatalogError::Network(_))));
        }

        #[tokio::test]
        async fn test_default_combined_search_uses_typed_methods() {
            struct TypedOnly;

            #[async_trait]
            impl MusicProvider for TypedOnly {
                fn id(&self) -> ProviderId {
                    ProviderId::MusicBrainz
                }
                async fn search_artists(&self, _q: &str, _l: usize) -> Result<Vec<Artist>, CatalogError> {
                    Ok(vec![artist(ProviderId::MusicBrainz, "Autechre")])
                }
                async fn search_albums(&self, _q: &str, _l: usize) -> Result<Vec<Album>, CatalogError> {
                    Ok(vec![])
                }
                async fn search_tracks(&self, _q: &str, _l: usize) -> Result<Vec<Track>, CatalogError> {
                    Ok(vec![track(ProviderId::MusicBrainz, "Gantz Graf", "Autechre")])
                }
                async fn get_artist(&self, id: &str) -> Result<Artist, CatalogError> {
                    Err(CatalogError::NotFound(id.to_string()))
                }
                async fn get_album(&self, id: &str) -> Result<(Album, Vec<Track>), CatalogError> {
                    Err(CatalogError::NotFound(id.to_string()))
                }
                async fn get_track(&self, id: &str) -> Result<Track, CatalogError> {
                    Err(CatalogError::NotFound(id.to_string()))
                }
            }

            let results = TypedOnly.search("autechre", 5).await.unwrap();
            assert_eq!(results.artists.len(), 1);
            assert!(results.albums.is_empty());
            assert_eq!(results.tracks[0].title, "Gantz Graf");
            assert!(TypedOnly.discography().is_none());
        }

        #[tokio::test]
        async fn test_upsert_artist_by_name_is_idempotent() {
            let store = MemoryStore::default();
            let mut a = artist(ProviderId::Spotify, "Boards of Canada");
            let id1 = store.upsert_artist_by_name(&a).await.unwrap();

            a.popularity = Some(70);
            let id2 = store.upsert_artist_by_name(&a).await.unwrap();

            assert_eq!(id1, id2);
            let artists = store.artists();
            assert_eq!(artists.len(), 1);
            assert_eq!(artists[0].1.popularity, Some(70));
        }
    }
}
