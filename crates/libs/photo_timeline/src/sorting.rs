//! Chronological ordering of normalized photos.
use common_types::PhotoMetadata;

/// Orders photos by capture time, ascending.
///
/// The sort is stable. Within a run of identical timestamps, photos that have a
/// location are ordered among themselves by the location's textual form, while the
/// slots held by photos without a location stay where the stable sort put them.
#[must_use]
pub fn sort_chronologically(mut photos: Vec<PhotoMetadata>) -> Vec<PhotoMetadata> {
    photos.sort_by_key(|p| p.captured_at);

    let mut start = 0;
    while start < photos.len() {
        let captured_at = photos[start].captured_at;
        let run = photos[start..]
            .iter()
            .take_while(|p| p.captured_at == captured_at)
            .count();
        order_located_ties(&mut photos[start..start + run]);
        start += run;
    }
    photos
}

fn order_located_ties(run: &mut [PhotoMetadata]) {
    let mut located: Vec<(String, usize)> = run
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.location.map(|l| (l.to_string(), i)))
        .collect();
    if located.len() < 2 {
        return;
    }

    let slots: Vec<usize> = located.iter().map(|(_, i)| *i).collect();
    located.sort_by(|a, b| a.0.cmp(&b.0));
    let reordered: Vec<PhotoMetadata> = located.iter().map(|(_, i)| run[*i].clone()).collect();
    for (slot, photo) in slots.into_iter().zip(reordered) {
        run[slot] = photo;
    }
}

/// Whether `photos` is in non-decreasing capture order.
#[must_use]
pub fn is_chronological(photos: &[PhotoMetadata]) -> bool {
    photos
        .windows(2)
        .all(|pair| pair[0].captured_at <= pair[1].captured_at)
}
