use crate::error::{ExtractError, Result};
use crate::models::Coordinate;

/// Representative point of a way: the mean of its vertices on the unit sphere.
///
/// Every vertex is mapped to a 3D unit vector, the vectors are averaged
/// component-wise, and the mean vector is projected back to lat/lon. This is
/// an unweighted vertex mean, not the area centroid of the enclosed polygon;
/// a closed ring whose last vertex repeats the first counts that vertex twice.
///
/// `id` is only used to label the error for an empty sequence.
pub fn spherical_centroid(id: i64, points: &[Coordinate]) -> Result<Coordinate> {
    if points.is_empty() {
        return Err(ExtractError::InvalidGeometry { id });
    }

    let (mut sum_x, mut sum_y, mut sum_z) = (0.0f64, 0.0f64, 0.0f64);
    for p in points {
        let lat = p.lat.to_radians();
        let lon = p.lon.to_radians();
        sum_x += lat.cos() * lon.cos();
        sum_y += lat.cos() * lon.sin();
        sum_z += lat.sin();
    }

    let n = points.len() as f64;
    let (avg_x, avg_y, avg_z) = (sum_x / n, sum_y / n, sum_z / n);

    let lon = avg_y.atan2(avg_x).to_degrees();
    let lat = avg_z.atan2(avg_x.hypot(avg_y)).to_degrees();

    Ok(Coordinate { lat, lon })
}
