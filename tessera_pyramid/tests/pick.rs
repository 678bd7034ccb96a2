// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pick queries through `PickIndex` and `PickPyramid`.

use kurbo::{Point, Rect};
use tessera_precise_hit::{BoundsHit, Circle, Shape};
use tessera_pyramid::{Coord, PickIndex, PickPyramid};

#[test]
fn circle_hit_and_miss() {
    let mut index = PickIndex::new();
    index.insert([Circle::new(Point::new(10.0, 10.0), 5.0)]);

    let hit = index.search_point(Point::new(10.0, 10.0)).unwrap();
    assert_eq!(hit.center, Point::new(10.0, 10.0));
    assert!(index.search_point(Point::new(100.0, 100.0)).is_none());
    assert!(index.search_rect(Rect::new(14.0, 9.0, 20.0, 11.0)).is_some());
    assert!(index.search_rect(Rect::new(14.0, 14.0, 20.0, 20.0)).is_none());
}

#[test]
fn large_sets_find_the_right_shape() {
    let mut index = PickIndex::new();
    let dots: Vec<_> = (0..40)
        .flat_map(|x| (0..40).map(move |y| (x, y)))
        .map(|(x, y)| Circle::new(Point::new(f64::from(x) * 10.0, f64::from(y) * 10.0), 3.0))
        .collect();
    index.insert(dots);
    assert_eq!(index.len(), 1600);

    let hit = index.search_point(Point::new(231.0, 118.0)).unwrap();
    assert_eq!(hit.center, Point::new(230.0, 120.0));
    // Between dots.
    assert!(index.search_point(Point::new(235.0, 115.0)).is_none());
}

#[test]
fn pyramid_follows_tiles_in_and_out() {
    let mut pyramid: PickPyramid<Shape> = PickPyramid::new();
    let tile_size = 256.0;

    // Level 2 plane is 1024px; tile 2/1/1 spans [256, 512)².
    pyramid.insert(
        Coord::new(2, 1, 1),
        [Shape::from(BoundsHit::new(Rect::new(256.0, 256.0, 512.0, 512.0)))],
    );
    pyramid.insert(
        Coord::new(3, 0, 0),
        [Shape::from(Circle::new(Point::new(16.0, 16.0), 8.0))],
    );

    // Unit point (0.375, 0.375) is inside tile 2/1/1.
    let p = Point::new(0.375, 0.375);
    assert!(pyramid.search_point(p, 2.0, tile_size).is_some());
    assert!(pyramid.search_point(p, 1.6, tile_size).is_some());
    assert!(pyramid.search_point(p, 2.4, tile_size).is_some());
    assert!(pyramid.search_point(p, 1.4, tile_size).is_none());

    // Level 3 plane is 2048px; (16, 16) is the unit point (1/128, 1/128).
    let q = Point::new(1.0 / 128.0, 1.0 / 128.0);
    assert!(pyramid.search_point(q, 3.0, tile_size).is_some());
    let r = Rect::new(0.0, 0.0, 1.0 / 64.0, 1.0 / 64.0);
    assert!(pyramid.search_rect(r, 2.7, tile_size).is_some());

    let shapes = pyramid.remove(Coord::new(2, 1, 1));
    assert_eq!(shapes.len(), 1);
    assert!(pyramid.search_point(p, 2.0, tile_size).is_none());
    assert_eq!(pyramid.levels().collect::<Vec<_>>(), [3]);

    pyramid.clear();
    assert!(pyramid.is_empty());
    assert!(!pyramid.contains(Coord::new(3, 0, 0)));
}

#[test]
#[should_panic(expected = "already indexed")]
fn double_insert_panics() {
    let mut pyramid = PickPyramid::new();
    pyramid.insert(Coord::new(1, 0, 0), [Circle::new(Point::ORIGIN, 1.0)]);
    pyramid.insert(Coord::new(1, 2, 0), [Circle::new(Point::ORIGIN, 1.0)]);
}

#[test]
#[should_panic(expected = "no shapes are indexed")]
fn removing_unknown_tile_panics() {
    let mut pyramid: PickPyramid<Circle> = PickPyramid::new();
    pyramid.remove(Coord::new(1, 0, 0));
}
