use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::Vec3;
use log::debug;

use crate::builder::Scene;
use crate::error::{Result, SvdagError};

/// Minimal wavefront OBJ mesh: vertex positions and triangulated faces.
pub struct Obj {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    pub aabb: (Vec3, Vec3),
}

impl Obj {
    /// Parses `v` and `f` statements; faces with more than three vertices
    /// are fan-triangulated, `v/vt/vn` references keep only the position
    /// index. Everything else in the file is ignored.
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let mut vertices = Vec::new();
        let mut faces: Vec<[u32; 3]> = Vec::new();

        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let x = parse_coordinate(tokens.next(), number)?;
                    let y = parse_coordinate(tokens.next(), number)?;
                    let z = parse_coordinate(tokens.next(), number)?;

                    let vertex = Vec3::new(x, y, z);
                    min = min.min(vertex);
                    max = max.max(vertex);
                    vertices.push(vertex);
                }
                Some("f") => {
                    let first = parse_vertex_index(tokens.next(), number)?;
                    let mut previous = parse_vertex_index(tokens.next(), number)?;
                    let mut any = false;
                    for token in tokens {
                        let current = parse_vertex_index(Some(token), number)?;
                        faces.push([first, previous, current]);
                        previous = current;
                        any = true;
                    }
                    if !any {
                        return Err(SvdagError::InputRejected {
                            reason: format!("face with fewer than 3 vertices on line {}", number + 1),
                        });
                    }
                }
                _ => {}
            }
        }

        for face in &faces {
            for &vertex in face {
                if vertex == 0 || vertex as usize > vertices.len() {
                    return Err(SvdagError::InputRejected {
                        reason: format!(
                            "face references vertex {vertex}, file has {}",
                            vertices.len()
                        ),
                    });
                }
            }
        }

        debug!(
            "parsed {} vertices, {} faces from {}",
            vertices.len(),
            faces.len(),
            path.as_ref().display()
        );

        Ok(Self {
            vertices,
            faces,
            aabb: (min, max),
        })
    }
}

fn parse_coordinate(token: Option<&str>, line: usize) -> Result<f32> {
    token
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| SvdagError::InputRejected {
            reason: format!("malformed vertex on line {}", line + 1),
        })
}

fn parse_vertex_index(token: Option<&str>, line: usize) -> Result<u32> {
    token
        .and_then(|token| token.split('/').next())
        .and_then(|index| index.parse().ok())
        .ok_or_else(|| SvdagError::InputRejected {
            reason: format!("malformed face on line {}", line + 1),
        })
}

impl Scene for Obj {
    fn bounds(&self) -> (Vec3, Vec3) {
        self.aabb
    }

    fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    fn triangle(&self, index: usize) -> (Vec3, Vec3, Vec3) {
        let [a, b, c] = self.faces[index];
        (
            self.vertices[(a - 1) as usize],
            self.vertices[(b - 1) as usize],
            self.vertices[(c - 1) as usize],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_triangles_and_bounds() {
        let path = write_temp(
            "svdag_obj_triangles.obj",
            "# comment\nv 0 0 0\nv 1 0 0\nv 0 2 0\nf 1 2 3\n",
        );
        let obj = Obj::parse(&path).unwrap();
        assert_eq!(obj.triangle_count(), 1);
        assert_eq!(obj.bounds(), (Vec3::ZERO, Vec3::new(1.0, 2.0, 0.0)));
        let (v0, _, v2) = obj.triangle(0);
        assert_eq!(v0, Vec3::ZERO);
        assert_eq!(v2, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn fan_triangulates_quads_and_strips_attributes() {
        let path = write_temp(
            "svdag_obj_quads.obj",
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1/1/1 2/2/2 3/3/3 4/4/4\n",
        );
        let obj = Obj::parse(&path).unwrap();
        assert_eq!(obj.triangle_count(), 2);
        assert_eq!(obj.faces[0], [1, 2, 3]);
        assert_eq!(obj.faces[1], [1, 3, 4]);
    }

    #[test]
    fn dangling_face_reference_is_rejected() {
        let path = write_temp("svdag_obj_dangling.obj", "v 0 0 0\nf 1 2 3\n");
        assert!(matches!(
            Obj::parse(&path),
            Err(SvdagError::InputRejected { .. })
        ));
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        assert!(matches!(
            Obj::parse("/nonexistent/svdag_mesh.obj"),
            Err(SvdagError::Io(_))
        ));
    }
}
