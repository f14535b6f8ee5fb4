#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use strum::VariantArray;

    use crate::board::Board;
    use crate::builder::{BuildFailure, BuilderInvalidReason, LevelBuilder};
    use crate::cell::CellKind;
    use crate::evaluate::{base_trace, evaluate};
    use crate::level::{Level, RotateOutcome, Session};
    use crate::location::{Dimension, Location};
    use crate::logic::{at_least, at_most, exactly_one};
    use crate::path::{generate_path, random_walk, shortest_path};
    use crate::plan::LinkPlan;
    use crate::shape::{Connections, Direction};

    fn dims(rows: usize, cols: usize) -> (Dimension, Dimension) {
        (NonZero::new(rows).unwrap(), NonZero::new(cols).unwrap())
    }

    fn adjacent(a: Location, b: Location) -> bool {
        Direction::direction_to(a, b).is_some()
    }

    // S┐
    // ·E
    fn elbow_board() -> Board {
        let mut board = Board::new(dims(2, 2), Location(0, 0), Location(1, 1));
        board.link(Location(0, 0), Location(0, 1));
        board.link(Location(0, 1), Location(1, 1));
        board
    }

    fn rotations(board: &Board) -> Vec<u8> {
        board.freeze().iter().map(|cell| cell.rotation).collect()
    }

    #[test]
    fn directions() {
        assert_eq!(Direction::Up.invert(), Direction::Down);
        assert_eq!(Direction::Left.invert(), Direction::Right);
        assert_eq!(Direction::Left.rotated(1), Direction::Up);
        assert_eq!(Direction::Right.rotated(3), Direction::Up);
        assert_eq!(Direction::direction_to(Location(2, 2), Location(2, 3)), Some(Direction::Right));
        assert_eq!(Direction::direction_to(Location(2, 2), Location(3, 3)), None);
        assert_eq!(Direction::Up.step_within(Location(0, 3), dims(4, 4)), None);
        assert_eq!(Direction::Left.step_within(Location(3, 0), dims(4, 4)), None);
        assert_eq!(Direction::Down.step_within(Location(3, 0), dims(4, 4)), None);
        assert_eq!(Direction::Down.step_within(Location(2, 0), dims(4, 4)), Some(Location(3, 0)));
        assert_eq!(Direction::neighbors_of(Location(0, 0), dims(3, 3)), vec![
            (Direction::Right, Location(0, 1)),
            (Direction::Down, Location(1, 0)),
        ]);
    }

    #[test]
    fn connections_rotate_clockwise() {
        let elbow = Connections::from([Direction::Up, Direction::Right]);
        assert_eq!(elbow.rotated(1), Connections::from([Direction::Right, Direction::Down]));
        assert_eq!(elbow.rotated(2), Connections::from([Direction::Down, Direction::Left]));
        assert_eq!(elbow.glyph(), '└');
        assert_eq!(elbow.rotated(1).glyph(), '┌');

        let tee = Connections::from([Direction::Up, Direction::Right, Direction::Down]);
        assert_eq!(tee.len(), 3);
        assert_eq!(tee.rotated(4), tee);
        assert_eq!(tee.iter().collect::<Vec<_>>(), vec![Direction::Up, Direction::Right, Direction::Down]);

        let mut straight = Connections::NONE;
        assert!(straight.insert(Direction::Left));
        assert!(!straight.insert(Direction::Left));
        straight.insert(Direction::Right);
        assert_eq!(straight.glyph(), '─');
        assert!(straight.remove(Direction::Left));
        assert_eq!(straight.len(), 1);
    }

    #[test]
    fn display_hand_built() {
        let mut board = elbow_board();
        assert_eq!(format!("{}", board), "S┐
·E
");
        assert_eq!(board.audit(), Ok(()));

        board.cell_at_mut(Location(0, 1)).unwrap().rotate();
        assert_eq!(format!("{}", board), "S┘
·E
");
    }

    #[test]
    fn rotation_idempotence() {
        let mut board = elbow_board();
        let before = board.view(Location(0, 1)).unwrap();
        for _ in 0..4 {
            board.cell_at_mut(Location(0, 1)).unwrap().rotate();
        }
        assert_eq!(board.view(Location(0, 1)).unwrap(), before);
    }

    #[test]
    fn evaluate_follows_rotations() {
        let mut board = elbow_board();
        let trace = evaluate(&board);
        assert!(trace.reaches(Location(1, 1)));
        assert_eq!(trace.path_to(Location(1, 1)), Some(vec![Location(0, 0), Location(0, 1), Location(1, 1)]));
        assert!(!trace.reaches(Location(1, 0)));

        board.cell_at_mut(Location(0, 1)).unwrap().rotate();
        let trace = evaluate(&board);
        assert!(!trace.reaches(Location(1, 1)));
        assert_eq!(trace.path_to(Location(1, 1)), None);
        assert!(base_trace(&board).reaches(Location(1, 1)));
    }

    #[test]
    fn evaluate_parents_follow_direction_order() {
        // S┬┐
        // ·└E   two routes to the end; going right first wins the tie
        let mut board = Board::new(dims(2, 3), Location(0, 0), Location(1, 2));
        board.link(Location(0, 0), Location(0, 1));
        board.link(Location(0, 1), Location(0, 2));
        board.link(Location(0, 1), Location(1, 1));
        board.link(Location(0, 2), Location(1, 2));
        board.link(Location(1, 1), Location(1, 2));

        let trace = evaluate(&board);
        assert_eq!(trace.parent_of(Location(0, 0)), None);
        assert_eq!(trace.parent_of(Location(1, 1)), Some(Location(0, 1)));
        assert_eq!(trace.parent_of(Location(1, 2)), Some(Location(0, 2)));
        assert_eq!(trace.path_to(Location(1, 2)), Some(vec![Location(0, 0), Location(0, 1), Location(0, 2), Location(1, 2)]));
        assert_eq!(trace.reached().len(), 5);
    }

    #[test]
    fn evaluator_determinism() {
        let level = LevelBuilder::default().build(&mut StdRng::seed_from_u64(11)).unwrap();
        let first = evaluate(level.board());
        for _ in 0..5 {
            assert_eq!(evaluate(level.board()), first);
        }
    }

    #[test]
    fn hint_falls_back_to_base_path() {
        let mut board = elbow_board();
        board.cell_at_mut(Location(0, 1)).unwrap().rotate();
        let level = Level::new(board);

        assert!(!level.is_solved());
        assert_eq!(level.hint(), vec![Location(0, 0), Location(0, 1), Location(1, 1)]);
    }

    #[test]
    fn locked_win_state() {
        let mut board = elbow_board();
        board.cell_at_mut(Location(0, 1)).unwrap().rotate();
        let mut level = Level::new(board);

        assert_eq!(level.rotate(Location(0, 1)), RotateOutcome::Rotated { solved: false });
        assert_eq!(level.rotate(Location(0, 1)), RotateOutcome::Rotated { solved: false });
        assert_eq!(level.rotate(Location(0, 1)), RotateOutcome::Rotated { solved: true });
        assert!(level.is_solved());
        assert_eq!(level.hint(), vec![Location(0, 0), Location(0, 1), Location(1, 1)]);

        let frozen = rotations(level.board());
        assert_eq!(level.rotate(Location(0, 1)), RotateOutcome::Locked);
        assert_eq!(level.rotate(Location(1, 0)), RotateOutcome::Locked);
        assert_eq!(rotations(level.board()), frozen);
    }

    #[test]
    fn endpoints_never_rotate() {
        let mut level = LevelBuilder::default().build(&mut StdRng::seed_from_u64(3)).unwrap();
        let (start, end) = (level.board().start(), level.board().end());

        for _ in 0..4 {
            assert_eq!(level.rotate(start), RotateOutcome::Locked);
            assert_eq!(level.rotate(end), RotateOutcome::Locked);
        }
        assert_eq!(level.board().view(start).unwrap().rotation, 0);
        assert_eq!(level.board().view(end).unwrap().rotation, 0);
        assert_eq!(level.rotate(Location(6, 0)), RotateOutcome::Locked);
    }

    #[test]
    fn random_walk_is_simple_path() {
        for (rows, cols) in [(2, 2), (3, 5), (6, 6), (8, 3)] {
            for seed in 0..25 {
                let mut rng = StdRng::seed_from_u64(seed);
                let (start, end) = (Location(0, 0), Location(rows - 1, cols - 1));
                let path = random_walk(dims(rows, cols), start, end, &mut rng).unwrap();

                assert_eq!(path.first(), Some(&start));
                assert_eq!(path.last(), Some(&end));
                assert!(path.windows(2).all(|pair| adjacent(pair[0], pair[1])));
                let mut distinct = path.clone();
                distinct.sort();
                distinct.dedup();
                assert_eq!(distinct.len(), path.len());
            }
        }
    }

    #[test]
    fn shortest_path_fallback() {
        let path = shortest_path(dims(4, 5), Location(0, 0), Location(3, 4)).unwrap();
        assert_eq!(path.len(), 8);
        assert_eq!(path.first(), Some(&Location(0, 0)));
        assert_eq!(path.last(), Some(&Location(3, 4)));
        assert!(path.windows(2).all(|pair| adjacent(pair[0], pair[1])));

        assert_eq!(shortest_path(dims(4, 5), Location(0, 0), Location(4, 0)), None);
    }

    #[test]
    fn two_by_two_path() {
        for seed in 0..10 {
            let path = generate_path(dims(2, 2), Location(0, 0), Location(1, 1), &mut StdRng::seed_from_u64(seed));
            assert_eq!(path.len(), 3);
            assert!(path[1] == Location(0, 1) || path[1] == Location(1, 0));
        }
    }

    #[test]
    fn two_by_two_scenario() {
        let (start, end) = (Location(0, 0), Location(1, 1));
        for seed in 0..10 {
            let level = LevelBuilder::with_dims(dims(2, 2))
                .endpoints(start, end)
                .build(&mut StdRng::seed_from_u64(seed))
                .unwrap();
            let board = level.board();
            assert_eq!(board.audit(), Ok(()));

            let start_cell = board.view(start).unwrap();
            let end_cell = board.view(end).unwrap();
            assert_eq!(start_cell.base.len(), 1);
            assert_eq!(end_cell.base.len(), 1);

            let towards_middle = start_cell.base.iter().next().unwrap();
            let middle = board.step(start, towards_middle).unwrap();
            let from_end = end_cell.base.iter().next().unwrap();
            assert_eq!(board.step(end, from_end), Some(middle));

            let middle_cell = board.view(middle).unwrap();
            assert_eq!(middle_cell.kind, CellKind::Pipe);
            assert_eq!(middle_cell.base, Connections::from([towards_middle.invert(), from_end.invert()]));
        }
    }

    #[test]
    fn constrain_endpoint_keeps_path_neighbor() {
        let (start, end) = (Location(1, 1), Location(2, 2));
        let path = vec![start, Location(1, 2), end];
        let mut plan = LinkPlan::new(dims(4, 4), start, end);
        plan.lay_path(&path);
        plan.constrain_endpoint(start, &path);
        plan.constrain_endpoint(end, &path);

        let mut board = Board::new(dims(4, 4), start, end);
        plan.apply(&mut board);
        assert_eq!(board.view(start).unwrap().base, Connections::from([Direction::Right]));
        assert_eq!(board.view(end).unwrap().base, Connections::from([Direction::Up]));
        assert_eq!(board.view(Location(1, 2)).unwrap().base, Connections::from([Direction::Left, Direction::Down]));
        assert!(plan.boxed_cells().is_empty());
    }

    #[test]
    fn constrain_endpoint_without_adjacent_path_neighbor() {
        // the degenerate last-resort path: two endpoints that are not adjacent
        let (start, end) = (Location(0, 0), Location(3, 3));
        let path = vec![start, end];
        let mut plan = LinkPlan::new(dims(4, 4), start, end);
        plan.lay_path(&path);
        assert_eq!(plan.state(start, end), None);

        plan.constrain_endpoint(start, &path);
        plan.constrain_endpoint(end, &path);

        let mut board = Board::new(dims(4, 4), start, end);
        plan.apply(&mut board);

        // first in-bounds neighbor clockwise from up
        assert_eq!(board.view(start).unwrap().base, Connections::from([Direction::Right]));
        assert!(board.view(Location(0, 1)).unwrap().base.contains(Direction::Left));
        assert_eq!(board.view(end).unwrap().base, Connections::from([Direction::Up]));
        assert!(board.view(Location(2, 3)).unwrap().base.contains(Direction::Down));
        assert_eq!(format!("{}", board), "S╴··
····
···╷
···E
");
    }

    #[test]
    fn pinned_endpoints_avoid_boxed_pipes() {
        // (0, 0) is boxed in unless the path leaves the start through it
        let (start, end) = (Location(0, 1), Location(5, 5));
        for seed in 0..30 {
            let level = LevelBuilder::default()
                .endpoints(start, end)
                .build(&mut StdRng::seed_from_u64(seed))
                .unwrap();
            let board = level.board();
            assert_eq!(board.audit(), Ok(()));
            assert_eq!(board.view(start).unwrap().base, Connections::from([Direction::Left]));

            for cell in board.freeze().iter().filter(|cell| cell.kind == CellKind::Pipe) {
                assert!((2..=3).contains(&cell.base.len()), "seed {}: {:?}", seed, cell);
            }
        }
    }

    #[test]
    fn solver_completes_plan() {
        let (start, end) = (Location(1, 1), Location(2, 2));
        let path = vec![start, Location(1, 2), end];
        let mut plan = LinkPlan::new(dims(4, 4), start, end);
        plan.lay_path(&path);
        plan.constrain_endpoint(start, &path);
        plan.constrain_endpoint(end, &path);
        plan.complete().unwrap();

        let mut board = Board::new(dims(4, 4), start, end);
        plan.apply(&mut board);
        assert_eq!(board.audit(), Ok(()));
        for cell in board.freeze().iter().filter(|cell| cell.kind == CellKind::Pipe) {
            assert!((2..=3).contains(&cell.base.len()), "{:?}", cell);
        }
    }

    #[test]
    fn greedy_fill_completes_plan() {
        let (start, end) = (Location(1, 1), Location(2, 2));
        let path = vec![start, Location(1, 2), end];
        for seed in 0..20 {
            let mut plan = LinkPlan::new(dims(4, 4), start, end);
            plan.lay_path(&path);
            plan.constrain_endpoint(start, &path);
            plan.constrain_endpoint(end, &path);
            plan.fill(&mut StdRng::seed_from_u64(seed), 0.3).unwrap();

            let mut board = Board::new(dims(4, 4), start, end);
            plan.apply(&mut board);
            assert_eq!(board.audit(), Ok(()));
        }
    }

    #[test]
    fn generated_boards_hold_invariants() {
        for (rows, cols) in [(4, 4), (5, 7), (6, 6), (9, 4)] {
            for seed in 0..40 {
                let level = LevelBuilder::with_dims(dims(rows, cols))
                    .build(&mut StdRng::seed_from_u64(seed))
                    .unwrap();
                let board = level.board();

                // mutual consistency, endpoint degree, base solvability
                assert_eq!(board.audit(), Ok(()), "{}x{} seed {}", rows, cols, seed);
                assert!(base_trace(board).reaches(board.end()));
                assert_ne!(board.start(), board.end());

                for cell in board.freeze().iter() {
                    match cell.kind {
                        CellKind::Pipe => assert!((2..=3).contains(&cell.base.len()), "{:?}", cell),
                        _ => {
                            assert_eq!(cell.base.len(), 1);
                            assert_eq!(cell.rotation, 0);
                        }
                    }
                    assert!(cell.rotation < 4);
                    assert_eq!(cell.exits, cell.base.rotated(cell.rotation));
                    assert_eq!(cell.exits.len(), cell.base.len());
                }
            }
        }
    }

    #[test]
    fn small_boards_hold_invariants() {
        for (rows, cols) in [(2, 2), (2, 3), (3, 2), (3, 3)] {
            for seed in 0..40 {
                let level = LevelBuilder::with_dims(dims(rows, cols))
                    .build(&mut StdRng::seed_from_u64(seed))
                    .unwrap();
                assert_eq!(level.board().audit(), Ok(()), "{}x{} seed {}", rows, cols, seed);
            }
        }
    }

    #[test]
    fn junction_chance_extremes() {
        for chance in [0.0, 1.0] {
            for seed in 0..10 {
                let level = LevelBuilder::default()
                    .junction_chance(chance)
                    .build(&mut StdRng::seed_from_u64(seed))
                    .unwrap();
                assert_eq!(level.board().audit(), Ok(()));
            }
        }
    }

    #[test]
    fn seeded_generation_reproduces() {
        let a = LevelBuilder::default().build(&mut StdRng::seed_from_u64(99)).unwrap();
        let b = LevelBuilder::default().build(&mut StdRng::seed_from_u64(99)).unwrap();

        assert_eq!(format!("{}", a.board()), format!("{}", b.board()));
        assert_eq!(a.board().freeze(), b.board().freeze());
    }

    #[test]
    fn hints_walk_from_start_to_end() {
        for seed in 0..20 {
            let level = LevelBuilder::default().build(&mut StdRng::seed_from_u64(seed)).unwrap();
            let board = level.board();
            let hint = level.hint();

            assert_eq!(hint.first(), Some(&board.start()));
            assert_eq!(hint.last(), Some(&board.end()));
            assert!(hint.windows(2).all(|pair| adjacent(pair[0], pair[1])));
        }
    }

    #[test]
    fn invalid_builders() {
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(
            LevelBuilder::with_dims(dims(1, 5)).build(&mut rng).unwrap_err(),
            BuildFailure::Invalid(vec![BuilderInvalidReason::DimsTooSmall]),
        );
        assert_eq!(
            LevelBuilder::default().endpoints(Location(0, 0), Location(6, 0)).is_valid(),
            Some(&vec![BuilderInvalidReason::FeatureOutOfBounds]),
        );
        assert_eq!(
            LevelBuilder::default().endpoints(Location(2, 2), Location(2, 2)).is_valid(),
            Some(&vec![BuilderInvalidReason::EndpointsCoincide]),
        );
        assert_eq!(
            LevelBuilder::default().junction_chance(1.5).is_valid(),
            Some(&vec![BuilderInvalidReason::JunctionChanceOutOfRange]),
        );
        assert_eq!(
            LevelBuilder::default().attempts(0).is_valid(),
            Some(&vec![BuilderInvalidReason::NoAttempts]),
        );
        assert_eq!(LevelBuilder::default().is_valid(), None);
    }

    #[test]
    fn session_hint_toggle() {
        let mut session = Session::new(LevelBuilder::default(), StdRng::seed_from_u64(5)).unwrap();
        assert!(!session.hints());
        assert!(session.visible_hint().is_empty());

        session.set_hints(true);
        let hint = session.visible_hint();
        assert_eq!(hint.first(), Some(&session.level().board().start()));
        assert_eq!(hint.last(), Some(&session.level().board().end()));

        let level = session.new_level().unwrap();
        assert_eq!(level.board().audit(), Ok(()));
        assert!(!session.visible_hint().is_empty());
    }

    #[test]
    fn session_rotates_pipes() {
        let mut session = Session::new(LevelBuilder::default(), StdRng::seed_from_u64(8)).unwrap();
        let pipe = session.level().board().freeze().iter()
            .find(|cell| cell.kind == CellKind::Pipe)
            .unwrap()
            .location;
        let before = session.level().board().view(pipe).unwrap().rotation;

        match session.rotate(pipe) {
            RotateOutcome::Rotated { solved } => {
                assert_eq!(solved, session.is_solved());
                assert_eq!(session.level().board().view(pipe).unwrap().rotation, (before + 1) % 4);
            }
            // a scramble that already connects start to end locks the level from the outset
            RotateOutcome::Locked => assert!(session.is_solved()),
        }
    }

    #[test]
    fn cardinality_clauses() {
        let vars = (0..4).map(varisat::Var::from_index).collect::<Vec<_>>();

        assert_eq!(at_most(&vars, 3).len(), 1);
        assert_eq!(at_most(&vars, 4).len(), 0);
        assert_eq!(at_least(&vars, 2).len(), 4);
        assert_eq!(at_least(&vars, 0).len(), 0);
        assert_eq!(at_least(&vars[..1], 2), vec![Vec::new()]);
        assert_eq!(exactly_one(&vars[..3]).len(), 4);
    }

    #[test]
    fn every_direction_has_a_glyph() {
        for direction in Direction::VARIANTS {
            assert_ne!(Connections::from([*direction]).glyph(), '·');
        }
        assert_eq!(Connections::NONE.glyph(), '·');
    }
}
