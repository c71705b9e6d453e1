use crate::shared::region::{round_half_even, Region};

/// Clusters overlapping detection candidates into one region per face.
///
/// Candidates are partitioned into equivalence classes under
/// [`Region::is_similar`]; each class is replaced by its average rectangle.
/// Classes with `min_neighbors` or fewer members are dropped, as are averaged
/// rectangles nested inside a better-supported neighbour. With
/// `min_neighbors == 0` the candidates are returned untouched.
pub fn group_regions(candidates: &[Region], min_neighbors: u32, eps: f64) -> Vec<Region> {
    if min_neighbors == 0 || candidates.is_empty() {
        return candidates.to_vec();
    }

    let (labels, class_count) = partition(candidates, eps);

    let mut sums = vec![[0i64; 4]; class_count];
    let mut weights = vec![0u32; class_count];
    for (r, &cls) in candidates.iter().zip(&labels) {
        let s = &mut sums[cls];
        s[0] += r.x as i64;
        s[1] += r.y as i64;
        s[2] += r.width as i64;
        s[3] += r.height as i64;
        weights[cls] += 1;
    }

    let averaged: Vec<Region> = sums
        .iter()
        .zip(&weights)
        .map(|(s, &n)| {
            let inv = 1.0f32 / n as f32;
            let avg = |v: i64| round_half_even((v as f32 * inv) as f64);
            Region::new(avg(s[0]), avg(s[1]), avg(s[2]), avg(s[3]))
        })
        .collect();

    let mut grouped = Vec::new();
    for (i, r1) in averaged.iter().enumerate() {
        let n1 = weights[i];
        if n1 <= min_neighbors {
            continue;
        }

        let swallowed = averaged.iter().enumerate().any(|(j, r2)| {
            let n2 = weights[j];
            j != i
                && n2 > min_neighbors
                && r1.is_inside(r2, eps)
                && (n2 > n1.max(3) || n1 < 3)
        });
        if !swallowed {
            grouped.push(*r1);
        }
    }
    grouped
}

/// Union-find partition. Class ids are assigned in order of first
/// appearance so the output order is stable for a given input.
fn partition(regions: &[Region], eps: f64) -> (Vec<usize>, usize) {
    let n = regions.len();
    let mut parent: Vec<usize> = (0..n).collect();
    let mut rank = vec![0u8; n];

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if !regions[i].is_similar(&regions[j], eps) {
                continue;
            }
            let ri = find(&mut parent, i);
            let rj = find(&mut parent, j);
            if ri == rj {
                continue;
            }
            match rank[ri].cmp(&rank[rj]) {
                std::cmp::Ordering::Less => parent[ri] = rj,
                std::cmp::Ordering::Greater => parent[rj] = ri,
                std::cmp::Ordering::Equal => {
                    parent[rj] = ri;
                    rank[ri] += 1;
                }
            }
        }
    }

    let mut class_of_root = vec![usize::MAX; n];
    let mut labels = Vec::with_capacity(n);
    let mut classes = 0;
    for i in 0..n {
        let root = find(&mut parent, i);
        if class_of_root[root] == usize::MAX {
            class_of_root[root] = classes;
            classes += 1;
        }
        labels.push(class_of_root[root]);
    }
    (labels, classes)
}
