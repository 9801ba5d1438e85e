//! Built-in level: a 24x24 map with procedural wall and sprite textures.

use std::sync::Arc;

use grid_raycaster::{GridWorld, Result, SpriteInstance, Texture, TileGrid, Vec2, pack_rgb};

const TEX_SIZE: usize = 64;
const KEY: u32 = pack_rgb(255, 0, 255);

const MAP: &str = "\
111111111111111111111111
1......................1
1..2222.........33333..1
1..2..2.........3...3..1
1..2..2.........3...3..1
1..2..2.........3...3..1
1..22.2.........33.33..1
1......................1
1......................1
1.........4.4.4........1
1......................1
1.........4...4........1
1......................1
1.........4.4.4........1
1......................1
1......................1
155555555.....5........1
15.5....5..............1
15...5..5..............1
15.5....5..............1
15...5..5..............1
15.5....5..............1
15......5..............1
111111111111111111111111";

pub fn world(face_shading: bool) -> Result<GridWorld> {
    let grid = TileGrid::parse(MAP)?;
    let textures = vec![
        brick(pack_rgb(150, 40, 30), pack_rgb(90, 90, 90))?,
        planks(pack_rgb(120, 80, 40))?,
        checker(pack_rgb(40, 70, 140), pack_rgb(200, 200, 220))?,
        stone()?,
        brick(pack_rgb(60, 110, 50), pack_rgb(30, 40, 30))?,
    ];
    Ok(GridWorld::new(grid, textures)?.with_face_shading(face_shading))
}

pub fn sprites() -> Result<Vec<SpriteInstance>> {
    let pillar = Arc::new(pillar()?);
    let barrel = Arc::new(barrel()?);
    let lamp = Arc::new(lamp()?);

    let mut sprites: Vec<SpriteInstance> = [(11.5, 10.5), (13.5, 10.5), (11.5, 12.5), (13.5, 12.5)]
        .into_iter()
        .map(|(x, y)| SpriteInstance::new(Vec2::new(x, y), pillar.clone()))
        .collect();
    sprites.extend(
        [(18.5, 4.5), (4.5, 4.5), (20.5, 20.5)]
            .into_iter()
            .map(|(x, y)| SpriteInstance::new(Vec2::new(x, y), barrel.clone()).with_scale(0.6)),
    );
    sprites.extend(
        [(8.5, 11.5), (16.5, 11.5), (12.5, 18.5)]
            .into_iter()
            .map(|(x, y)| SpriteInstance::new(Vec2::new(x, y), lamp.clone())),
    );
    Ok(sprites)
}

fn generate(f: impl Fn(usize, usize) -> u32) -> Result<Texture> {
    let pixels = (0..TEX_SIZE * TEX_SIZE)
        .map(|i| f(i % TEX_SIZE, i / TEX_SIZE))
        .collect();
    Texture::new(TEX_SIZE, TEX_SIZE, pixels)
}

// Cheap deterministic per-texel noise in [0, 255]
fn hash(x: usize, y: usize) -> u8 {
    let mut h = (x as u32).wrapping_mul(374_761_393) ^ (y as u32).wrapping_mul(668_265_263);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    (h >> 24) as u8
}

fn scale(color: u32, k: u8) -> u32 {
    let ch = |shift: u32| (((color >> shift) & 0xFF) * k as u32 / 255) as u8;
    pack_rgb(ch(16), ch(8), ch(0))
}

fn brick(face: u32, mortar: u32) -> Result<Texture> {
    generate(|x, y| {
        let row = y / 16;
        let offset = if row % 2 == 0 { 0 } else { 16 };
        if y % 16 < 2 || (x + offset) % 32 < 2 {
            mortar
        } else {
            scale(face, 200 + hash(x, y) / 5)
        }
    })
}

fn planks(wood: u32) -> Result<Texture> {
    generate(|x, y| {
        if x % 16 == 0 {
            scale(wood, 90)
        } else {
            let grain = ((y as f32 * 0.4 + (x % 16) as f32).sin() * 20.0) as i32;
            scale(wood, (215 + grain) as u8)
        }
    })
}

fn checker(a: u32, b: u32) -> Result<Texture> {
    generate(|x, y| if (x / 8 + y / 8) % 2 == 0 { a } else { b })
}

fn stone() -> Result<Texture> {
    generate(|x, y| {
        let n = 100 + hash(x / 4, y / 4) / 3 + hash(x, y) / 10;
        pack_rgb(n, n, n.saturating_add(10))
    })
}

fn pillar() -> Result<Texture> {
    let tex = generate(|x, y| {
        let cap = y < 6 || y >= TEX_SIZE - 6;
        let (lo, hi) = if cap { (16, 48) } else { (22, 42) };
        if x < lo || x >= hi {
            KEY
        } else {
            let light = 255 - ((x as i32 - 32).unsigned_abs() * 6) as u8;
            scale(pack_rgb(210, 200, 180), light)
        }
    })?;
    Ok(tex.with_transparent(KEY))
}

fn barrel() -> Result<Texture> {
    let tex = generate(|x, y| {
        let dx = x as f32 - 31.5;
        let bulge = 24.0 + 4.0 * (1.0 - ((y as f32 - 31.5) / 32.0).powi(2));
        if dx.abs() > bulge {
            KEY
        } else if y % 20 < 3 {
            pack_rgb(60, 60, 70)
        } else {
            scale(pack_rgb(140, 90, 40), 255 - (dx.abs() * 3.0) as u8)
        }
    })?;
    Ok(tex.with_transparent(KEY))
}

fn lamp() -> Result<Texture> {
    let tex = generate(|x, y| {
        let dx = x as f32 - 31.5;
        let dy = y as f32 - 10.0;
        if dx * dx + dy * dy < 64.0 {
            pack_rgb(255, 240, 150)
        } else if y > 10 && y < 40 && dx.abs() < 1.5 {
            pack_rgb(40, 40, 40)
        } else {
            KEY
        }
    })?;
    Ok(tex.with_transparent(KEY))
}

#[cfg(test)]
mod tests {
    use grid_raycaster::TileWorld;

    use super::*;

    #[test]
    fn demo_level_builds() {
        let world = world(true).unwrap();
        assert_eq!(world.grid().width(), 24);
        assert_eq!(world.grid().height(), 24);

        let start = grid_raycaster::ControlsConfig::default().start;
        assert!(!world.is_solid(start.x as i64, start.y as i64));
    }

    #[test]
    fn demo_sprites_stand_in_open_cells() {
        let world = world(false).unwrap();
        for sprite in sprites().unwrap() {
            let p = sprite.position;
            assert!(!world.is_solid(p.x as i64, p.y as i64), "{p}");
            assert!(sprite.texture.transparent().is_some());
        }
    }
}
