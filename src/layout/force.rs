use petgraph::algo::dijkstra;
use rand::Rng;

use crate::graph::{GraphModel, Position};

/// Closest two nodes may get when computing forces
const MIN_DISTANCE: f64 = 0.01;

/// Force-directed layout - Fruchterman-Reingold.
///
/// Starts from uniformly random positions in the unit square, so two runs do
/// not give the same picture. O(n²) per iteration.
pub(super) fn spring(graph: &GraphModel, iterations: usize) -> Vec<Position> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![Position::new(0.0, 0.0); n];
    }

    let mut rng = rand::thread_rng();
    let mut pos: Vec<Position> = (0..n)
        .map(|_| Position::new(rng.gen::<f64>(), rng.gen::<f64>()))
        .collect();

    let adjacency = graph.adjacency();
    let k = (1.0 / n as f64).sqrt();
    let k_squared = k * k;
    // Largest step per iteration, cooled linearly to zero
    let mut temperature = 0.1;
    let cooling = temperature / (iterations as f64 + 1.0);

    for _ in 0..iterations {
        let mut disp = vec![(0.0_f64, 0.0_f64); n];

        // Repulsive forces between all pairs: k² / d
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = pos[i].x - pos[j].x;
                let dy = pos[i].y - pos[j].y;
                let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = k_squared / dist;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                disp[i].0 += fx;
                disp[i].1 += fy;
                disp[j].0 -= fx;
                disp[j].1 -= fy;
            }
        }

        // Attractive forces along edges: d² / k
        for (i, neighbours) in adjacency.iter().enumerate() {
            for &j in neighbours.iter().filter(|&&j| j > i) {
                let dx = pos[j].x - pos[i].x;
                let dy = pos[j].y - pos[i].y;
                let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = dist * dist / k;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                disp[i].0 += fx;
                disp[i].1 += fy;
                disp[j].0 -= fx;
                disp[j].1 -= fy;
            }
        }

        // Apply with temperature limiting
        for (p, (fx, fy)) in pos.iter_mut().zip(disp) {
            let mag = (fx * fx + fy * fy).sqrt().max(MIN_DISTANCE);
            let step = mag.min(temperature);
            p.x += fx / mag * step;
            p.y += fy / mag * step;
        }

        temperature -= cooling;
    }

    pos
}

/// Kamada-Kawai style layout by stress majorization.
///
/// Target distances are undirected shortest-path lengths; pairs in different
/// components use the longest finite distance plus one. Starts from a circle,
/// so the result is deterministic for a given graph.
pub(super) fn kamada_kawai(graph: &GraphModel, iterations: usize) -> Vec<Position> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![Position::new(0.0, 0.0); n];
    }

    let dist = shortest_paths(graph);
    let mut pos = super::circular(n);

    for _ in 0..iterations {
        let mut moved: f64 = 0.0;

        for i in 0..n {
            let (mut sx, mut sy, mut sw) = (0.0, 0.0, 0.0);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = dist[i][j];
                let w = 1.0 / (d * d);
                let dx = pos[i].x - pos[j].x;
                let dy = pos[i].y - pos[j].y;
                let current = (dx * dx + dy * dy).sqrt();
                let (tx, ty) = if current > f64::EPSILON {
                    (pos[j].x + d * dx / current, pos[j].y + d * dy / current)
                } else {
                    (pos[j].x, pos[j].y)
                };
                sx += w * tx;
                sy += w * ty;
                sw += w;
            }
            let next = Position::new(sx / sw, sy / sw);
            moved = moved.max(next.distance(&pos[i]));
            pos[i] = next;
        }

        if moved < 1e-6 {
            break;
        }
    }

    pos
}

/// All-pairs undirected hop distances; unreachable pairs get `max + 1`
fn shortest_paths(graph: &GraphModel) -> Vec<Vec<f64>> {
    let undirected = graph.undirected();
    let n = undirected.node_count();
    let mut dist = vec![vec![f64::INFINITY; n]; n];

    for start in undirected.node_indices() {
        let row = &mut dist[start.index()];
        for (node, hops) in dijkstra(&undirected, start, None, |_| 1.0_f64) {
            row[node.index()] = hops;
        }
    }

    let max_finite = dist
        .iter()
        .flatten()
        .copied()
        .filter(|d| d.is_finite())
        .fold(0.0_f64, f64::max);
    let unreachable = max_finite + 1.0;
    for d in dist.iter_mut().flatten() {
        if d.is_infinite() {
            *d = unreachable;
        }
    }

    dist
}
