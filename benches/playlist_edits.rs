//! Benchmarks for playlist editing.
//!
//! Run with: cargo bench --bench playlist_edits

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use melodia::{MusicLibrary, Playlist, Song};

/// Builds a playlist of `len` songs cycling through the demo catalog.
fn filled_playlist(songs: &[Song], len: usize) -> Playlist {
    let mut playlist = Playlist::new("Bench");
    for song in songs.iter().cycle().take(len) {
        playlist.add_song(song.clone());
    }
    playlist
}

fn bench_append(c: &mut Criterion) {
    let library = MusicLibrary::demo();
    let songs = library.songs();

    c.bench_function("playlist_append_1000", |b| {
        b.iter(|| black_box(filled_playlist(black_box(songs), 1_000)));
    });
}

fn bench_remove(c: &mut Criterion) {
    let library = MusicLibrary::demo();
    let songs = library.songs();
    let last = &songs[songs.len() - 1];
    let mut group = c.benchmark_group("playlist_remove");

    for len in [10, 100, 1_000] {
        let playlist = filled_playlist(songs, len);
        group.bench_with_input(BenchmarkId::new("last_song", len), &playlist, |b, playlist| {
            b.iter_batched(
                || playlist.clone(),
                |mut playlist| black_box(playlist.remove_song(black_box(last))),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_append, bench_remove);
criterion_main!(benches);
