#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use unordered_pair::UnorderedPair;

    use crate::api::{self, GenerateRequest, GraphPayload, HintRequest, HintStatus, Operation};
    use crate::explain::{LocalExplainer, NoExplainer, NO_EXPLANATION};
    use crate::generator::{generate, generate_seeded, level, Difficulty, GenerateError, Kind};
    use crate::graph::{encode_edge, parse_edge, EdgeParseError, Graph, GraphError};
    use crate::hint::{classify_moves, next_move, Hint, HintError, Move, VisitedState};
    use crate::solver::{solve, verify_trail, SolveError};

    fn triangle() -> Graph {
        Graph::new(vec![1, 2, 3], [(1, 2), (2, 3), (3, 1)])
    }

    // triangle 1-2-3 with a tail 1-4; odd vertices are 1 and 4
    fn triangle_with_tail() -> Graph {
        Graph::new(vec![1, 2, 3, 4], [(1, 4), (1, 2), (2, 3), (3, 1)])
    }

    fn step(from: u32, to: u32) -> Hint {
        Hint::Move(Move { from, to })
    }

    #[test]
    fn parse_and_encode_edges() {
        assert_eq!(parse_edge("3-7"), Ok(UnorderedPair(3, 7)));
        assert_eq!(parse_edge(" 7 - 3 "), Ok(UnorderedPair(3, 7)));
        assert_eq!(parse_edge("37"), Err(EdgeParseError::MissingSeparator));
        assert!(matches!(parse_edge("a-3"), Err(EdgeParseError::BadEndpoint(_))));
        assert!(matches!(parse_edge("3-"), Err(EdgeParseError::BadEndpoint(_))));
        assert_eq!(encode_edge(UnorderedPair(5, 2)), "5-2");
    }

    #[test]
    fn degrees_count_loops_twice() {
        let graph = Graph::new(vec![1, 2], [(1, 1), (1, 2)]);
        assert_eq!(graph.degree(1), 3);
        assert_eq!(graph.degree(2), 1);
        assert_eq!(graph.odd_vertices(), vec![1, 2]);
    }

    #[test]
    fn validate_rejects_unknown_nodes() {
        let graph = Graph::new(vec![1, 2], [(1, 2), (2, 9)]);
        assert_eq!(graph.validate(), Err(GraphError::UnknownNode { node: 9, edge: "2-9".to_string() }));
        assert!(matches!(solve(&graph), Err(SolveError::InvalidInput(_))));
    }

    #[test]
    fn solve_triangle() {
        let graph = triangle();
        let trail = solve(&graph).unwrap();
        assert_eq!(trail.len(), 4);
        assert_eq!(trail.first(), trail.last());
        assert_eq!(trail[0], 1);
        assert!(verify_trail(&graph, &trail));
    }

    #[test]
    fn solve_simple_path() {
        let graph = Graph::new(vec![1, 2, 3, 4], [(1, 2), (2, 3), (3, 4)]);
        let trail = solve(&graph).unwrap();
        assert!(trail == vec![1, 2, 3, 4] || trail == vec![4, 3, 2, 1]);
    }

    #[test]
    fn solve_square_with_diagonal() {
        let graph = Graph::new(vec![1, 2, 3, 4], [(1, 2), (2, 3), (3, 4), (4, 1), (1, 3)]);
        let trail = solve(&graph).unwrap();
        assert_eq!(trail.len(), 6);
        assert!(verify_trail(&graph, &trail));
        let ends = [trail[0], trail[5]];
        assert!(ends == [1, 3] || ends == [3, 1]);
    }

    #[test]
    fn solve_consumes_parallel_edges_one_at_a_time() {
        let doubled = Graph::new(vec![1, 2], [(1, 2), (1, 2)]);
        assert_eq!(solve(&doubled).unwrap(), vec![1, 2, 1]);

        let tripled = Graph::new(vec![1, 2], [(1, 2), (2, 1), (1, 2)]);
        assert_eq!(solve(&tripled).unwrap(), vec![1, 2, 1, 2]);

        let mixed = Graph::new(vec![1, 2, 3], [(1, 2), (1, 2), (2, 3), (3, 1), (1, 3)]);
        let trail = solve(&mixed).unwrap();
        assert_eq!(trail.len(), 6);
        assert!(verify_trail(&mixed, &trail));
    }

    #[test]
    fn solve_with_self_loop() {
        let graph = Graph::new(vec![1, 2], [(1, 1), (1, 2)]);
        let trail = solve(&graph).unwrap();
        assert_eq!(trail.len(), 3);
        assert!(verify_trail(&graph, &trail));
    }

    #[test]
    fn solve_rejects_four_odd_vertices() {
        let star = Graph::new(vec![1, 2, 3, 4], [(1, 2), (1, 3), (1, 4)]);
        assert_eq!(solve(&star), Err(SolveError::Unsolvable { odd_vertices: vec![1, 2, 3, 4] }));
    }

    #[test]
    fn solve_rejects_disconnected_graph() {
        let two_triangles = Graph::new(vec![1, 2, 3, 4, 5, 6], [(1, 2), (2, 3), (3, 1), (4, 5), (5, 6), (6, 4)]);
        assert_eq!(solve(&two_triangles), Err(SolveError::Disconnected { covered: 3, total: 6 }));
        assert!(!two_triangles.is_connected());
    }

    #[test]
    fn solve_without_edges() {
        assert_eq!(solve(&Graph::new(vec![1, 2, 3], Vec::new())), Ok(vec![]));
        assert_eq!(solve(&Graph::new(Vec::new(), Vec::new())), Ok(vec![]));
    }

    #[test]
    fn isolated_nodes_do_not_matter() {
        let graph = Graph::new(vec![9, 1, 2, 3], [(1, 2), (2, 3), (3, 1)]);
        assert!(graph.is_connected());
        let trail = solve(&graph).unwrap();
        assert_eq!(trail[0], 1);
        assert!(verify_trail(&graph, &trail));
    }

    #[test]
    fn verify_trail_spots_bad_trails() {
        let graph = triangle();
        assert!(verify_trail(&graph, &[2, 3, 1, 2]));
        assert!(!verify_trail(&graph, &[1, 2, 3]));
        assert!(!verify_trail(&graph, &[1, 2, 1, 3]));
        assert!(!verify_trail(&graph, &[1, 3, 1, 2]));
    }

    #[test]
    fn hint_prefers_non_bridge() {
        // the tail 1-4 comes first in adjacency order but would strand the triangle
        let graph = triangle_with_tail();
        let state = VisitedState::new(None);

        let candidates = classify_moves(&graph, &state).unwrap();
        assert_eq!(candidates.len(), 3);
        assert!(candidates[0].bridge);
        assert_eq!(candidates[0].step, Move { from: 1, to: 4 });
        assert!(!candidates[1].bridge);
        assert!(!candidates[2].bridge);

        assert_eq!(next_move(&graph, &state), Ok(step(1, 2)));
    }

    #[test]
    fn hint_on_square_with_diagonal() {
        let graph = Graph::new(vec![1, 2, 3, 4], [(1, 2), (2, 3), (3, 4), (4, 1), (1, 3)]);
        let state = VisitedState::from_history(&graph, &Vec::<String>::new(), Some(1));

        assert!(classify_moves(&graph, &state).unwrap().iter().all(|candidate| !candidate.bridge));
        assert_eq!(next_move(&graph, &state), Ok(step(1, 2)));
    }

    #[test]
    fn hint_takes_forced_bridge() {
        let graph = triangle_with_tail();
        let state = VisitedState::from_history(&graph, &["1-2", "2-3", "3-1"], Some(1));

        let candidates = classify_moves(&graph, &state).unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].bridge);
        assert_eq!(next_move(&graph, &state), Ok(step(1, 4)));
    }

    #[test]
    fn hint_forced_through_parallel_edge() {
        // after 1-2 and 2-3, node 3 has only the parallel edges back to 1 left
        let graph = Graph::new(vec![1, 2, 3], [(1, 2), (2, 3), (3, 1), (3, 1), (1, 3)]);
        let state = VisitedState::from_history(&graph, &["1-2", "2-3"], Some(3));
        assert_eq!(next_move(&graph, &state), Ok(step(3, 1)));
    }

    #[test]
    fn hint_reports_completion() {
        let graph = triangle_with_tail();
        let state = VisitedState::from_history(&graph, &["1-2", "2-3", "3-1", "4-1"], Some(4));
        assert_eq!(next_move(&graph, &state), Ok(Hint::Completed));

        assert_eq!(next_move(&Graph::new(vec![1], Vec::new()), &VisitedState::new(None)), Ok(Hint::Completed));
    }

    #[test]
    fn hint_reports_dead_end() {
        let graph = triangle_with_tail();
        let state = VisitedState::from_history(&graph, &["1-4"], Some(4));
        assert_eq!(next_move(&graph, &state), Ok(Hint::DeadEnd { position: 4 }));
    }

    #[test]
    fn hint_unsolvable_without_position() {
        let star = Graph::new(vec![1, 2, 3, 4], [(1, 2), (1, 3), (1, 4)]);
        assert_eq!(
            next_move(&star, &VisitedState::new(None)),
            Err(HintError::Unsolvable { odd_vertices: vec![1, 2, 3, 4] })
        );
        // once under way, the player still gets moves
        assert_eq!(next_move(&star, &VisitedState::new(Some(2))), Ok(step(2, 1)));
    }

    #[test]
    fn hint_unknown_position() {
        assert_eq!(next_move(&triangle(), &VisitedState::new(Some(7))), Err(HintError::UnknownEndpoint(7)));
    }

    #[test]
    fn history_is_lenient_and_capped() {
        let graph = Graph::new(vec![1, 2, 3], [(1, 2), (1, 2), (2, 3)]);
        let state = VisitedState::from_history(&graph, &["2-1", "1-2", "1-2", "junk", "4-", "3-9", ""], Some(2));

        assert_eq!(state.visited(UnorderedPair(1, 2)), 2);
        assert_eq!(state.visited(UnorderedPair(2, 3)), 0);
        assert_eq!(state.visited(UnorderedPair(3, 9)), 0);
        assert_eq!(next_move(&graph, &state), Ok(step(2, 3)));
    }

    #[test]
    fn hint_is_idempotent() {
        let graph = Graph::new(vec![1, 2, 3, 4, 5], [(1, 2), (2, 3), (3, 1), (1, 4), (4, 5), (5, 1)]);
        let state = VisitedState::from_history(&graph, &["1-2"], Some(2));
        let first = next_move(&graph, &state);
        for _ in 0..5 {
            assert_eq!(next_move(&graph, &state), first);
        }
    }

    #[test]
    fn following_hints_draws_everything() {
        // two triangles sharing node 1, plus a pendant path 3-6-7-3
        let graph = Graph::new(
            vec![1, 2, 3, 4, 5, 6, 7],
            [(1, 2), (2, 3), (3, 1), (1, 4), (4, 5), (5, 1), (3, 6), (6, 7), (7, 3)],
        );
        let mut state = VisitedState::new(None);
        let mut trail = Vec::new();

        loop {
            match next_move(&graph, &state).unwrap() {
                Hint::Move(mv) => {
                    if trail.is_empty() {
                        trail.push(mv.from);
                    }
                    trail.push(mv.to);
                    state.apply(mv);
                }
                Hint::Completed => break,
                Hint::DeadEnd { position } => panic!("stuck at {}", position),
            }
        }

        assert!(verify_trail(&graph, &trail));
    }

    #[test]
    fn generate_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(generate(2, 0.5, Kind::Circuit, &mut rng), Err(GenerateError::InvalidInput(_))));
        assert!(matches!(generate(5, 1.5, Kind::Path, &mut rng), Err(GenerateError::InvalidInput(_))));
        assert!(matches!(generate(5, -0.1, Kind::Path, &mut rng), Err(GenerateError::InvalidInput(_))));
    }

    #[test]
    fn generate_circuits_and_paths() {
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            for kind in [Kind::Circuit, Kind::Path] {
                let graph = generate(7, 0.4, kind, &mut rng).unwrap();
                assert_eq!(graph.nodes(), &[1, 2, 3, 4, 5, 6, 7]);
                assert!(graph.is_connected());
                assert_eq!(graph.odd_vertices().len(), kind.odd_vertices());
                assert!(graph.nodes().iter().all(|node| graph.degree(*node) > 0));
                assert!(verify_trail(&graph, &solve(&graph).unwrap()));
            }
        }
    }

    #[test]
    fn generate_from_empty_skeleton() {
        let mut rng = StdRng::seed_from_u64(7);
        let graph = generate(6, 0.0, Kind::Circuit, &mut rng).unwrap();
        assert!(graph.is_connected());
        assert!(graph.odd_vertices().is_empty());
    }

    #[test]
    fn generate_repairs_parity_on_complete_graph() {
        // K4 has four odd vertices, all pairwise adjacent, so each pair loses its edge
        let mut rng = StdRng::seed_from_u64(3);
        let graph = generate(4, 1.0, Kind::Circuit, &mut rng).unwrap();
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.nodes().iter().all(|node| graph.degree(*node) == 2));
    }

    #[test]
    fn generate_is_reproducible() {
        let a = generate(8, 0.5, Kind::Path, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate(8, 0.5, Kind::Path, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn levels_follow_their_tier() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let params = difficulty.params();
            for index in 1..=5 {
                let graph = level(difficulty, index).unwrap();
                assert!(params.nodes.contains(&graph.nodes().len()));
                assert_eq!(graph.odd_vertices().len(), params.kind.odd_vertices());
                assert_eq!(graph, level(difficulty, index).unwrap());
            }
        }

        assert!(generate_seeded(Difficulty::Hard, None).is_ok());
    }

    #[test]
    fn difficulty_parses() {
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(Difficulty::Medium.to_string(), "medium");
        assert_eq!(Kind::Path.to_string(), "path");
    }

    #[test]
    fn api_solve() {
        let response = api::handle_json(Operation::Solve, r#"{"nodes": [1, 2, 3], "edges": [[1, 2], [2, 3], [3, 1]]}"#, &NoExplainer).unwrap();
        assert_eq!(response, r#"{"ok":true,"path":[1,2,3,1]}"#);

        let failed = api::solve(&GraphPayload { nodes: vec![1, 2, 3, 4], edges: vec![[1, 2], [1, 3], [1, 4]] });
        assert!(!failed.ok);
        assert!(failed.path.is_none());
        assert!(failed.error.unwrap().contains("odd degree"));
    }

    #[test]
    fn api_hint() {
        let request: HintRequest = serde_json::from_str(
            r#"{"nodes": [1, 2, 3, 4], "edges": [[1, 4], [1, 2], [2, 3], [3, 1]], "visitedEdges": ["4-1", "oops"], "pathEndpoint": 1}"#
        ).unwrap();
        assert_eq!(request.path_endpoint, Some(1));

        let response = api::hint(&request, &NoExplainer);
        assert!(response.ok);
        assert_eq!(response.status, HintStatus::Move);
        assert_eq!(response.step, Some([1, 2]));
        assert_eq!(response.explanation, NO_EXPLANATION);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["move"], serde_json::json!([1, 2]));
        assert_eq!(json["status"], "move");
    }

    #[test]
    fn api_hint_statuses() {
        let graph = GraphPayload::from(&triangle_with_tail());

        let done = api::hint(&HintRequest {
            graph: graph.clone(),
            visited_edges: vec!["1-4".into(), "1-2".into(), "2-3".into(), "3-1".into()],
            path_endpoint: Some(1),
        }, &LocalExplainer);
        assert!(done.ok);
        assert_eq!(done.status, HintStatus::Completed);
        assert_eq!(done.explanation, NO_EXPLANATION);

        let stuck = api::hint(&HintRequest { graph, visited_edges: vec!["1-4".into()], path_endpoint: Some(4) }, &NoExplainer);
        assert!(!stuck.ok);
        assert_eq!(stuck.status, HintStatus::DeadEnd);
        assert!(stuck.step.is_none());

        let star = GraphPayload { nodes: vec![1, 2, 3, 4], edges: vec![[1, 2], [1, 3], [1, 4]] };
        let unsolvable = api::hint(&HintRequest { graph: star, ..Default::default() }, &NoExplainer);
        assert_eq!(unsolvable.status, HintStatus::Unsolvable);
    }

    #[test]
    fn local_explanation_names_bridges() {
        let request = HintRequest { graph: GraphPayload::from(&triangle_with_tail()), ..Default::default() };
        let response = api::hint(&request, &LocalExplainer);
        assert_eq!(response.step, Some([1, 2]));
        assert!(response.explanation.contains("Avoid 1-4"));
    }

    #[test]
    fn api_generate() {
        let request = GenerateRequest { difficulty: Difficulty::Hard, index: Some(2), seed: None };
        let response = api::generate(&request);
        assert!(response.ok);
        let graph = Graph::from(&response.graph.unwrap());
        assert_eq!(graph.odd_vertices().len(), 2);

        let json = api::handle_json(Operation::Generate, r#"{"difficulty": "easy", "seed": 9}"#, &NoExplainer).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ok"], true);
        assert!(value["nodes"].is_array());
        assert!(value["edges"].is_array());
    }

    #[test]
    fn api_rejects_malformed_json() {
        assert!(api::handle_json(Operation::Solve, "{\"nodes\": 3}", &NoExplainer).is_err());
    }
}
