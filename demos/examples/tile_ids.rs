// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Print the quadtree ids of an 8×8 block of tiles and the region words they fall in.
//!
//! Run:
//! - `cargo run -p quilt_demos --example tile_ids`

use quilt_tiling::{RegionMask, TileCoord, TileGrid, region_id, tile_coord, tile_id};

fn main() {
    println!("tile ids (row by row):");
    for y in 0..8 {
        let row: Vec<String> = (0..8)
            .map(|x| format!("{:>3}", tile_id(TileCoord::new(x, y)).0))
            .collect();
        println!("  {}", row.join(" "));
    }

    println!("regions (16 tiles per word):");
    for y in 0..8 {
        let row: Vec<String> = (0..8)
            .map(|x| format!("{:>3}", region_id(tile_id(TileCoord::new(x, y)))))
            .collect();
        println!("  {}", row.join(" "));
    }

    let grid = TileGrid::new(640);
    let id = grid.tile_id(2000.0, 700.0);
    let coord = tile_coord(id);
    println!(
        "world (2000, 700) -> tile {id} at column {}, row {}, origin {:?}",
        coord.x,
        coord.y,
        grid.origin_of(coord)
    );

    let mask = RegionMask::from_tiles([id, tile_id(TileCoord::new(0, 0))]);
    let ids: Vec<_> = mask.tile_ids().map(|t| t.0).collect();
    println!("mask spans {} region words, tiles {ids:?}", mask.regions());
}
