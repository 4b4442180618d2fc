// Line rasterization - the geometric primitive hyphae use to record the
// grid points their tip passes through.

/// Ordered grid points approximating the straight segment between two
/// positions, inclusive of both endpoints. Steps along the dominant axis so
/// consecutive points never skip a cell.
pub fn points_on_line(from: (f32, f32), to: (f32, f32)) -> Vec<(i32, i32)> {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil() as i32;
    if steps == 0 {
        return vec![(from.0.round() as i32, from.1.round() as i32)];
    }
    let mut points = Vec::with_capacity(steps as usize + 1);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        points.push((x.round() as i32, y.round() as i32));
    }
    points
}
