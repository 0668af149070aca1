//! Normal generation for meshes without normals

use glam::Vec3;

/// Smooth per-vertex normals: area-weighted average of adjacent face normals
pub fn calculate_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(&p0), Some(&p1), Some(&p2)) =
            (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let (v0, v1, v2) = (Vec3::from(p0), Vec3::from(p1), Vec3::from(p2));
        // Unnormalized cross product weights by triangle area
        let face = (v1 - v0).cross(v2 - v0);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }

    accum
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_quad_normals() {
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let normals = calculate_vertex_normals(&positions, &[0, 1, 2, 0, 2, 3]);
        for n in normals {
            assert_eq!(n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_unreferenced_vertex_gets_fallback() {
        let positions = [[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 5.0, 5.0]];
        let normals = calculate_vertex_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals[3], [0.0, 1.0, 0.0]);
    }
}
