// src/automaton/tests.rs

use super::*;
use crate::layout::{CoordinateMapper, Wiring};
use test_log::test;

fn engine(rows: usize, cols: usize, edges: EdgePolicy) -> LifeEngine {
    LifeEngine::new(GridDimensions::new(rows, cols).unwrap(), Rule::conway(), edges)
}

fn alive_cells(engine: &LifeEngine) -> Vec<(usize, usize)> {
    let dims = engine.dimensions();
    (0..dims.rows())
        .flat_map(|r| (0..dims.cols()).map(move |c| (r, c)))
        .filter(|(r, c)| engine.cell(*r, *c).unwrap().is_alive())
        .collect()
}

#[test]
fn blinker_should_oscillate_with_period_two() {
    let mut engine = engine(3, 3, EdgePolicy::Bounded);
    engine.seed(&Seed::Pattern(Pattern::Blinker)).unwrap();
    assert_eq!(alive_cells(&engine), vec![(1, 0), (1, 1), (1, 2)]);

    engine.step();
    assert_eq!(alive_cells(&engine), vec![(0, 1), (1, 1), (2, 1)]);
    assert_eq!(engine.generation(), 1);

    engine.step();
    assert_eq!(alive_cells(&engine), vec![(1, 0), (1, 1), (1, 2)]);
    assert_eq!(engine.generation(), 2);
}

#[test]
fn corner_cell_should_have_at_most_three_neighbors_without_wrap() {
    let mut engine = engine(4, 4, EdgePolicy::Bounded);
    for row in 0..4 {
        for col in 0..4 {
            engine.set_cell(row, col, CellState::Alive).unwrap();
        }
    }
    assert_eq!(engine.live_neighbors(0, 0), 3);
    assert_eq!(engine.live_neighbors(3, 3), 3);
    assert_eq!(engine.live_neighbors(1, 1), 8);
}

#[test]
fn corner_cell_with_one_neighbor_should_die() {
    let mut engine = engine(4, 4, EdgePolicy::Bounded);
    engine.set_cell(0, 0, CellState::Alive).unwrap();
    engine.set_cell(0, 1, CellState::Alive).unwrap();
    assert_eq!(engine.live_neighbors(0, 0), 1);

    engine.step();
    assert_eq!(engine.cell(0, 0).unwrap(), CellState::Dead);
    assert_eq!(engine.live_count(), 0);
}

#[test]
fn toroidal_edges_should_see_the_opposite_side() {
    let mut engine = engine(5, 5, EdgePolicy::Toroidal);
    engine.set_cell(4, 4, CellState::Alive).unwrap();
    engine.set_cell(0, 4, CellState::Alive).unwrap();
    engine.set_cell(4, 0, CellState::Alive).unwrap();
    assert_eq!(engine.live_neighbors(0, 0), 3);

    engine.step();
    assert!(engine.cell(0, 0).unwrap().is_alive());
}

#[test]
fn narrow_tori_should_count_each_neighbor_once() {
    let mut strip = engine(1, 5, EdgePolicy::Toroidal);
    strip.set_cell(0, 2, CellState::Alive).unwrap();
    assert_eq!(strip.live_neighbors(0, 2), 0);
    assert_eq!(strip.live_neighbors(0, 1), 1);
    strip.step();
    assert_eq!(strip.live_count(), 0);

    let mut square = engine(2, 2, EdgePolicy::Toroidal);
    for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        square.set_cell(row, col, CellState::Alive).unwrap();
    }
    assert_eq!(square.live_neighbors(0, 0), 3);

    let mut single = engine(1, 1, EdgePolicy::Toroidal);
    single.set_cell(0, 0, CellState::Alive).unwrap();
    assert_eq!(single.live_neighbors(0, 0), 0);
}

#[test]
fn step_should_be_deterministic() {
    let seed = Seed::Random {
        probability: 0.4,
        rng_seed: Some(7),
    };
    let mut first = engine(12, 17, EdgePolicy::Bounded);
    let mut second = engine(12, 17, EdgePolicy::Bounded);
    first.seed(&seed).unwrap();
    second.seed(&seed).unwrap();
    assert_eq!(first.cells(), second.cells());

    for _ in 0..10 {
        first.step();
        second.step();
        assert_eq!(first.cells(), second.cells());
    }
}

#[test]
fn glider_should_translate_diagonally_after_four_generations() {
    let mut engine = engine(8, 8, EdgePolicy::Bounded);
    engine.seed(&Seed::Pattern(Pattern::Glider)).unwrap();
    let before: Vec<_> = alive_cells(&engine);
    for _ in 0..4 {
        engine.step();
    }
    let shifted: Vec<_> = before.iter().map(|(r, c)| (r + 1, c + 1)).collect();
    assert_eq!(alive_cells(&engine), shifted);
}

#[test]
fn seeding_should_reject_patterns_that_do_not_fit() {
    let mut engine = engine(2, 2, EdgePolicy::Bounded);
    assert!(matches!(
        engine.seed(&Seed::Pattern(Pattern::Glider)),
        Err(MatrixError::InvalidSeed(_))
    ));
}

#[test]
fn seeding_should_reject_probabilities_outside_unit_interval() {
    let mut engine = engine(3, 3, EdgePolicy::Bounded);
    for probability in [-0.1, 1.5, f32::NAN] {
        let seed = Seed::Random {
            probability,
            rng_seed: Some(1),
        };
        assert!(matches!(engine.seed(&seed), Err(MatrixError::InvalidSeed(_))));
    }
}

#[test]
fn random_seed_extremes_fill_or_clear_the_grid() {
    let mut engine = engine(6, 6, EdgePolicy::Bounded);
    engine
        .seed(&Seed::Random {
            probability: 1.0,
            rng_seed: None,
        })
        .unwrap();
    assert_eq!(engine.live_count(), 36);
    engine
        .seed(&Seed::Random {
            probability: 0.0,
            rng_seed: None,
        })
        .unwrap();
    assert_eq!(engine.live_count(), 0);
}

#[test]
fn seeds_should_parse_from_names_and_probabilities() {
    assert_eq!("Glider".parse::<Seed>().unwrap(), Seed::Pattern(Pattern::Glider));
    assert_eq!(
        "r-pentomino".parse::<Seed>().unwrap(),
        Seed::Pattern(Pattern::RPentomino)
    );
    assert_eq!("random".parse::<Seed>().unwrap(), Seed::default());
    assert_eq!(
        "random:0.25".parse::<Seed>().unwrap(),
        Seed::Random {
            probability: 0.25,
            rng_seed: None
        }
    );
    assert_eq!(
        "0.5".parse::<Seed>().unwrap(),
        Seed::Random {
            probability: 0.5,
            rng_seed: None
        }
    );
    assert_eq!(
        "Random:0.5".parse::<Seed>().unwrap(),
        Seed::Random {
            probability: 0.5,
            rng_seed: None
        }
    );
    assert!(matches!(
        "random:lots".parse::<Seed>(),
        Err(MatrixError::InvalidSeed(_))
    ));
    assert!(matches!(
        "spaceship".parse::<Seed>(),
        Err(MatrixError::InvalidSeed(_))
    ));
}

#[test]
fn rules_should_parse_and_print_bs_notation() {
    let highlife: Rule = "B36/S23".parse().unwrap();
    assert_eq!(highlife.to_string(), "B36/S23");
    assert_eq!(highlife.next_state(CellState::Dead, 6), CellState::Alive);
    assert_eq!("b3/s23".parse::<Rule>().unwrap(), Rule::conway());
    assert!("B9/S23".parse::<Rule>().is_err());
    assert!("23/3".parse::<Rule>().is_err());
}

#[test]
fn paint_should_color_live_and_dead_cells() {
    let mut engine = engine(3, 3, EdgePolicy::Bounded);
    engine.seed(&Seed::Pattern(Pattern::Blinker)).unwrap();
    let dims = engine.dimensions();
    let mut frame = FrameBuffer::new(CoordinateMapper::new(dims, Wiring::default()));
    let palette = Palette {
        alive: Color::GREEN,
        dead: Color::BLUE,
    };

    engine.paint(&mut frame, &palette).unwrap();
    assert_eq!(frame.get(1, 1).unwrap(), Color::GREEN);
    assert_eq!(frame.get(0, 0).unwrap(), Color::BLUE);
}
