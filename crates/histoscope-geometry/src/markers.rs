//! Scattered point markers, drawn as a point cloud or as one small cube per point.

use glam::Vec3;
use histoscope_core::{tip_color_for, GeometryBuffer, MarkerMode, PointSet, RenderConfig};
use histoscope_render::Material;

use crate::output::{DrawOutput, PickTable, Primitive, Tooltip};
use crate::scales::DrawScales;
use crate::topology::{box_corner, box_normal, BOX_INDICES};

/// Render delay a marker draw asks for, so other painters can finish first.
pub const MARKER_RENDER_DELAY_MS: u64 = 100;

/// Stride between drawn points.
///
/// Thinning only applies to boxes mode with optimisation on and more points than
/// the size limit allows.
#[must_use]
pub fn marker_step(len: usize, config: &RenderConfig) -> usize {
    let thin = config.optimize_markers
        && config.marker_mode == MarkerMode::Boxes
        && config.marker_size_limit > 0
        && len > config.marker_size_limit;
    if thin {
        (len / config.marker_size_limit).max(2)
    } else {
        1
    }
}

/// Builds the marker node for a point set.
pub fn build_markers(points: &PointSet, scales: &DrawScales, config: &RenderConfig) -> DrawOutput {
    let mut output = DrawOutput {
        render_delay_ms: Some(MARKER_RENDER_DELAY_MS),
        ..DrawOutput::default()
    };
    if points.is_empty() {
        return output;
    }

    let size = scales.size3d() / 100.0;
    let step = marker_step(points.len(), config);
    let drawn: Vec<usize> = (0..points.len()).step_by(step).collect();
    let tooltip = Tooltip::Marker {
        half_size: 0.7 * size,
    };
    let tip_color = tip_color_for(config.fill_color);

    let primitive = match config.marker_mode {
        MarkerMode::Points => {
            let positions: Vec<Vec3> = drawn
                .iter()
                .map(|&i| scales.to_draw(points.points[i]))
                .collect();
            let pick = PickTable {
                group_size: 1,
                bins: drawn.clone(),
                tooltip,
                tip_color,
            };
            let mut material = Material::flat(config.fill_color);
            material.point_size = 3.0 * size;
            Primitive::points("markers", positions, material).with_pick(pick)
        }
        MarkerMode::Boxes => {
            let per_point = BOX_INDICES.len();
            let mut positions = Vec::with_capacity(drawn.len() * per_point);
            let mut normals = Vec::with_capacity(drawn.len() * per_point);
            for &i in &drawn {
                let center = scales.to_draw(points.points[i]);
                for k in 0..per_point {
                    positions.push(center + (box_corner(k) - Vec3::splat(0.5)) * size);
                    normals.push(box_normal(k));
                }
            }
            let buffer = GeometryBuffer {
                positions,
                normals: Some(normals),
                indices: None,
                group_size: per_point,
                bin_index_per_group: drawn.clone(),
            };
            let pick = PickTable::for_buffer(&buffer, tooltip, tip_color);
            Primitive::mesh("markers", buffer, Material::flat(config.fill_color)).with_pick(pick)
        }
    };
    log::debug!(
        "markers: {} of {} points drawn (step {step})",
        drawn.len(),
        points.len()
    );
    output.primitives.push(primitive);
    output
}

#[cfg(test)]
mod tests {
    use glam::DVec3;
    use histoscope_render::NodeKind;

    use super::*;
    use crate::output::DataSource;

    fn line_points(n: usize) -> PointSet {
        PointSet::new(
            (0..n)
                .map(|i| DVec3::new(i as f64, (i * 2) as f64, 1.0 + i as f64))
                .collect(),
        )
    }

    #[test]
    fn test_points_mode_one_vertex_per_point() {
        let points = line_points(10);
        let config = RenderConfig::default();
        let scales = DrawScales::for_points(&points, &config, &[None; 3]).unwrap();
        let output = build_markers(&points, &scales, &config);
        assert_eq!(output.render_delay_ms, Some(100));
        let marker = &output.primitives[0];
        match &marker.kind {
            NodeKind::Points(p) => assert_eq!(p.len(), 10),
            other => panic!("unexpected kind {other:?}"),
        }
        assert!((marker.material.point_size - 3.0).abs() < 1e-6);

        let pick = marker.pick.clone().unwrap();
        let tip = pick
            .resolve(4, &DataSource::Points(points), &scales)
            .unwrap();
        assert_eq!(tip.bin_id, 4);
        assert!((tip.value - 5.0).abs() < 1e-12);
        assert!((tip.bounds.x2 - tip.bounds.x1 - 1.4).abs() < 1e-4);
    }

    #[test]
    fn test_boxes_mode_thins_large_sets() {
        let points = line_points(100);
        let config = RenderConfig {
            marker_mode: MarkerMode::Boxes,
            marker_size_limit: 30,
            ..RenderConfig::default()
        };
        assert_eq!(marker_step(100, &config), 3);
        let scales = DrawScales::for_points(&points, &config, &[None; 3]).unwrap();
        let output = build_markers(&points, &scales, &config);
        let mesh = output.meshes().next().unwrap();
        assert_eq!(mesh.group_size, 36);
        assert_eq!(mesh.vertex_count(), 34 * 36);
        assert_eq!(mesh.bin_index_per_group[1], 3);
        let pick = output.primitives[0].pick.as_ref().unwrap();
        assert_eq!(pick.bin_of_vertex(36 * 2 + 7), Some(6));
    }

    #[test]
    fn test_step_at_least_two() {
        let config = RenderConfig {
            marker_mode: MarkerMode::Boxes,
            marker_size_limit: 40,
            ..RenderConfig::default()
        };
        assert_eq!(marker_step(50, &config), 2);
        assert_eq!(marker_step(40, &config), 1);
        let points_mode = RenderConfig {
            marker_size_limit: 40,
            ..RenderConfig::default()
        };
        assert_eq!(marker_step(500, &points_mode), 1);
    }

    #[test]
    fn test_empty_set_draws_nothing() {
        let points = PointSet::default();
        let config = RenderConfig::default();
        let scales = DrawScales::for_points(&points, &config, &[None; 3]).unwrap();
        let output = build_markers(&points, &scales, &config);
        assert!(output.primitives.is_empty());
    }
}
