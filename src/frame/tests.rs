// src/frame/tests.rs

use super::*;
use crate::layout::Wiring;

fn frame(rows: usize, cols: usize) -> FrameBuffer {
    let dims = GridDimensions::new(rows, cols).unwrap();
    FrameBuffer::new(CoordinateMapper::new(dims, Wiring::serpentine_rows(true)))
}

#[test]
fn it_should_return_what_was_set() {
    let mut frame = frame(3, 4);
    for row in 0..3 {
        for col in 0..4 {
            let color = Color::rgb(row as u8, col as u8, 7);
            frame.set(row, col, color).unwrap();
            assert_eq!(frame.get(row, col).unwrap(), color);
        }
    }
}

#[test]
fn it_should_reject_out_of_range_access() {
    let mut frame = frame(2, 2);
    assert!(matches!(frame.get(2, 0), Err(MatrixError::OutOfRange { .. })));
    assert!(matches!(
        frame.set(0, 2, Color::RED),
        Err(MatrixError::OutOfRange { .. })
    ));
}

#[test]
fn it_should_only_become_dirty_on_changes() {
    let mut frame = frame(2, 2);
    assert!(frame.is_dirty());
    frame.mark_clean();

    frame.set(1, 1, Color::BLACK).unwrap();
    frame.fill(Color::BLACK);
    assert!(!frame.is_dirty());

    frame.set(1, 1, Color::GREEN).unwrap();
    assert!(frame.is_dirty());
    frame.mark_clean();

    frame.fill(Color::GREEN);
    assert!(frame.is_dirty());
    assert_eq!(frame.get(0, 0).unwrap(), Color::GREEN);
}

#[test]
fn it_should_snapshot_in_wiring_order() {
    let mut frame = frame(2, 3);
    // second row runs right to left on the strip
    frame.set(1, 0, Color::RED).unwrap();
    frame.set(0, 2, Color::BLUE).unwrap();

    let snapshot = frame.snapshot().unwrap();
    let indices: Vec<usize> = snapshot.pixels().iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(snapshot.pixels()[2].1, Color::BLUE);
    assert_eq!(snapshot.pixels()[5].1, Color::RED);

    assert_eq!(
        snapshot.logical_row(1).unwrap(),
        vec![Color::RED, Color::BLACK, Color::BLACK]
    );
}
