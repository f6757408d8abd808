//! Static catalog seeded on first launch.

use crate::model::challenge::{Challenge, Difficulty};

struct SeedEntry {
    id: &'static str,
    title: &'static str,
    artist: &'static str,
    description: &'static str,
    audio_url: &'static str,
    duration_secs: u32,
    points: u32,
    difficulty: Difficulty,
}

const SAMPLE_CATALOG: &[SeedEntry] = &[
    SeedEntry {
        id: "1",
        title: "Sunrise Groove",
        artist: "SoundHelix",
        description: "Ease into the day with a mellow electronic warm-up.",
        audio_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3",
        duration_secs: 372,
        points: 100,
        difficulty: Difficulty::Easy,
    },
    SeedEntry {
        id: "2",
        title: "City Lights",
        artist: "SoundHelix",
        description: "A steady mid-tempo ride through neon streets.",
        audio_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-2.mp3",
        duration_secs: 425,
        points: 150,
        difficulty: Difficulty::Medium,
    },
    SeedEntry {
        id: "3",
        title: "Deep Focus",
        artist: "SoundHelix",
        description: "Long-form ambient layers for a full listening session.",
        audio_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-3.mp3",
        duration_secs: 344,
        points: 200,
        difficulty: Difficulty::Medium,
    },
    SeedEntry {
        id: "4",
        title: "Night Drive",
        artist: "SoundHelix",
        description: "Stay with every synth swell to the very end.",
        audio_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-4.mp3",
        duration_secs: 302,
        points: 250,
        difficulty: Difficulty::Hard,
    },
    SeedEntry {
        id: "5",
        title: "Final Encore",
        artist: "SoundHelix",
        description: "The marathon track. Finish it for the biggest reward.",
        audio_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-5.mp3",
        duration_secs: 355,
        points: 300,
        difficulty: Difficulty::Hard,
    },
];

/// Returns the sample catalog in display order, all unattempted.
pub fn sample_challenges() -> Vec<Challenge> {
    SAMPLE_CATALOG
        .iter()
        .map(|entry| {
            let mut challenge = Challenge::new(
                entry.id,
                entry.title,
                entry.artist,
                entry.duration_secs,
                entry.points,
                entry.difficulty,
            );
            challenge.description = entry.description.to_string();
            challenge.audio_url = entry.audio_url.to_string();
            challenge
        })
        .collect()
}
