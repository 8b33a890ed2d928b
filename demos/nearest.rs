//! Example building the classic six-point tree and querying it.

use kd_index::kdtree::{KDTreeBuilder, KDTreeIndex};

fn main() {
    let points = [[2., 3.], [5., 4.], [9., 6.], [4., 7.], [8., 1.], [7., 2.]];

    let mut builder = KDTreeBuilder::<f64>::new();
    for point in points.iter() {
        builder.add(point).expect("all points are 2D");
    }
    let tree = builder.finish();

    println!("Pre-order traversal:");
    for node in tree.pre_order() {
        println!(
            "{}{:?} (split on axis {})",
            "  ".repeat(node.depth() as usize),
            node.point(),
            node.axis()
        );
    }

    let query = [3., 4.5];
    match tree.nearest(&query) {
        Ok(nearest) => println!(
            "\nThe nearest point to {:?} is {:?}, at distance {}",
            query, nearest.point, nearest.distance
        ),
        Err(err) => eprintln!("Query failed: {}", err),
    }
}
