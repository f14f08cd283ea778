//! # Behavior Tier Tests (T0-T5)
//!
//! If ANY tier fails, the engine is INVALID.
//!
//! ## Tiers
//! - T0: Transaction Integrity
//! - T1: Deterministic Pair Counting
//! - T2: Ranking
//! - T3: Multi-Hop Traversal
//! - T4: Persistence
//! - T5: Embedding and Recommendation

#![allow(clippy::float_arithmetic)]

use cooccur_core::{CoOccurrenceGraph, CooccurError, Ingestor, PairEntry};

fn three_baskets() -> CoOccurrenceGraph {
    let mut graph = CoOccurrenceGraph::new();
    graph.add_transaction(["a", "b", "c"]);
    graph.add_transaction(["a", "b"]);
    graph.add_transaction(["b", "c"]);
    graph
}

// =============================================================================
// TIER T0: TRANSACTION INTEGRITY
// =============================================================================

mod t0_transaction_integrity {
    use super::*;
    use cooccur_core::primitives::{MAX_ITEM_NAME_LENGTH, MAX_TRANSACTION_ITEMS};

    /// T0.1: Valid transactions are accepted.
    #[test]
    fn valid_transaction_accepted() {
        assert!(Ingestor::validate_transaction(&["milk", "bread"]).is_ok());
    }

    /// T0.2: Empty item names are rejected.
    #[test]
    fn empty_item_rejected() {
        let result = Ingestor::validate_transaction(&["milk", ""]);
        assert!(matches!(result, Err(CooccurError::InvalidItem)));
    }

    /// T0.3: Over-long item names are rejected.
    #[test]
    fn long_item_rejected() {
        let name = "x".repeat(MAX_ITEM_NAME_LENGTH + 1);
        assert!(matches!(
            Ingestor::validate_item(&name),
            Err(CooccurError::InvalidItem)
        ));
    }

    /// T0.4: Oversized baskets are rejected and leave the graph untouched.
    #[test]
    fn oversized_basket_rejected_atomically() {
        let items: Vec<String> = (0..=MAX_TRANSACTION_ITEMS).map(|i| format!("i{i}")).collect();
        let mut graph = CoOccurrenceGraph::new();

        let result = Ingestor::ingest_transaction(&mut graph, &items);
        assert!(matches!(result, Err(CooccurError::InvalidTransaction(_))));
        assert_eq!(graph.item_count(), 0);
        assert_eq!(graph.version(), 0);
    }

    /// T0.5: A batch with one bad transaction records nothing.
    #[test]
    fn batch_is_atomic() {
        let mut graph = CoOccurrenceGraph::new();
        let batch = vec![vec!["a", "b"], vec!["c", ""]];
        assert!(Ingestor::ingest_transactions(&mut graph, &batch).is_err());
        assert_eq!(graph.item_count(), 0);
    }

    /// T0.6: Grouped rows register items bought alone.
    #[test]
    fn grouped_rows_register_single_purchases() {
        let rows = [("o1", "milk"), ("o2", "soda"), ("o1", "bread")];
        let mut graph = CoOccurrenceGraph::new();

        let report = Ingestor::ingest_grouped(&mut graph, &rows).expect("ingest");
        assert_eq!(report.transactions, 2);
        assert_eq!(graph.items(), ["milk", "soda", "bread"]);
        assert_eq!(graph.get_count("milk", "bread"), 1);
        assert_eq!(graph.get_count("milk", "soda"), 0);
    }
}

// =============================================================================
// TIER T1: DETERMINISTIC PAIR COUNTING
// =============================================================================

mod t1_pair_counting {
    use super::*;

    /// T1.1: Three baskets give the documented counts.
    #[test]
    fn three_basket_counts() {
        let graph = three_baskets();
        assert_eq!(graph.get_count("a", "b"), 2);
        assert_eq!(graph.get_count("b", "c"), 2);
        assert_eq!(graph.get_count("a", "c"), 1);
        assert_eq!(graph.get_count("c", "a"), 1);
    }

    /// T1.2: Unknown names and self-pairs count zero.
    #[test]
    fn unknown_and_self_pairs_are_zero() {
        let mut graph = three_baskets();
        graph.add_pair("a", "a");
        assert_eq!(graph.get_count("a", "a"), 0);
        assert_eq!(graph.get_count("a", "zzz"), 0);
        assert_eq!(graph.pair_count(), 3);
    }

    /// T1.3: Duplicates inside a basket count once.
    #[test]
    fn duplicates_count_once() {
        let mut graph = CoOccurrenceGraph::new();
        graph.add_transaction(["x", "y", "x", "y"]);
        assert_eq!(graph.get_count("x", "y"), 1);
        assert_eq!(graph.items(), ["x", "y"]);
    }

    /// T1.4: Aggregated counts are added in either order, non-positive ignored.
    #[test]
    fn aggregated_counts() {
        let mut graph = CoOccurrenceGraph::new();
        graph.add_pair_with_count("p", "q", 4);
        graph.add_pair_with_count("q", "p", 3);
        graph.add_pair_with_count("p", "q", -2);
        graph.add_pair_with_count("p", "r", 0);

        assert_eq!(graph.get_count("p", "q"), 7);
        assert_eq!(graph.items(), ["p", "q"]);
    }

    /// T1.5: Ids are assigned in first-seen order.
    #[test]
    fn ids_follow_first_seen_order() {
        let graph = three_baskets();
        assert_eq!(graph.items(), ["a", "b", "c"]);
        assert_eq!(graph.id_of("c").map(|id| id.0), Some(2));
        assert_eq!(graph.name_of(cooccur_core::ItemId(1)), Some("b"));
    }
}

// =============================================================================
// TIER T2: RANKING
// =============================================================================

mod t2_ranking {
    use super::*;
    use cooccur_core::{Neighbor, are_often_copurchased, top_pairs, top_with_item};

    /// T2.1: Heaviest pair, ties broken by name.
    #[test]
    fn top_pair_breaks_ties_by_name() {
        assert_eq!(
            top_pairs(&three_baskets(), 1),
            vec![PairEntry {
                name_a: "a".into(),
                name_b: "b".into(),
                count: 2
            }]
        );
    }

    /// T2.2: Partners sorted by count then name.
    #[test]
    fn top_with_item_order() {
        let rows = top_with_item(&three_baskets(), "b", 5);
        assert_eq!(
            rows,
            vec![
                Neighbor {
                    name: "a".into(),
                    count: 2
                },
                Neighbor {
                    name: "c".into(),
                    count: 2
                },
            ]
        );
    }

    /// T2.3: Zero limits and unknown items are empty.
    #[test]
    fn degenerate_bounds() {
        let graph = three_baskets();
        assert!(top_pairs(&graph, 0).is_empty());
        assert!(top_with_item(&graph, "b", 0).is_empty());
        assert!(top_with_item(&graph, "zzz", 3).is_empty());
    }

    /// T2.4: Threshold check.
    #[test]
    fn often_copurchased_threshold() {
        let graph = three_baskets();
        assert!(are_often_copurchased(&graph, "a", "b", 2));
        assert!(!are_often_copurchased(&graph, "a", "c", 2));
        assert!(!are_often_copurchased(&graph, "a", "zzz", 0));
    }
}

// =============================================================================
// TIER T3: MULTI-HOP TRAVERSAL
// =============================================================================

mod t3_traversal {
    use super::*;
    use cooccur_core::Adjacency;

    fn chain() -> CoOccurrenceGraph {
        let mut graph = CoOccurrenceGraph::new();
        graph.add_pair("d", "c");
        graph.add_pair("c", "b");
        graph.add_pair("b", "a");
        graph
    }

    /// T3.1: Depth limits the hops.
    #[test]
    fn depth_limits_expansion() {
        let graph = chain();
        assert_eq!(graph.bfs_related("d", 1), ["c"]);
        assert_eq!(graph.bfs_related("d", 2), ["b", "c"]);
        assert_eq!(graph.bfs_related("d", 10), ["a", "b", "c"]);
    }

    /// T3.2: Boundaries degrade to empty.
    #[test]
    fn boundaries() {
        let graph = chain();
        assert!(graph.bfs_related("d", 0).is_empty());
        assert!(graph.bfs_related("zzz", 3).is_empty());
    }

    /// T3.3: The prebuilt index gives the same answers.
    #[test]
    fn adjacency_matches_graph() {
        let graph = chain();
        let adjacency = Adjacency::build(&graph);
        assert!(adjacency.is_current(&graph));
        for start in graph.items() {
            for depth in 0..4 {
                assert_eq!(
                    adjacency.bfs_related(&graph, start, depth),
                    graph.bfs_related(start, depth)
                );
            }
        }
    }
}

// =============================================================================
// TIER T4: PERSISTENCE
// =============================================================================

mod t4_persistence {
    use super::*;
    use cooccur_core::{
        PersistedGraph, PersistedItem, PersistedPair, RedbStore, graph_from_bytes, graph_to_bytes,
    };

    fn fruit_rows() -> PersistedGraph {
        PersistedGraph {
            items: vec![
                PersistedItem {
                    id: 2,
                    name: "banana".into(),
                },
                PersistedItem {
                    id: 1,
                    name: "apple".into(),
                },
                PersistedItem {
                    id: 3,
                    name: "carrot".into(),
                },
            ],
            pairs: vec![
                PersistedPair {
                    item1_id: 1,
                    item2_id: 2,
                    count: 5,
                },
                PersistedPair {
                    item1_id: 1,
                    item2_id: 3,
                    count: 2,
                },
            ],
        }
    }

    /// T4.1: Restore follows persisted id order, not row order.
    #[test]
    fn restore_orders_by_id() {
        let graph = CoOccurrenceGraph::restore(&fruit_rows()).expect("restore");
        assert_eq!(graph.items(), ["apple", "banana", "carrot"]);
        assert_eq!(graph.get_count("apple", "carrot"), 2);
        assert_eq!(graph.get_count("banana", "apple"), 5);
    }

    /// T4.2: Dangling pair ids are rejected.
    #[test]
    fn dangling_id_rejected() {
        let mut rows = fruit_rows();
        rows.pairs.push(PersistedPair {
            item1_id: 1,
            item2_id: 99,
            count: 1,
        });
        assert!(matches!(
            CoOccurrenceGraph::restore(&rows),
            Err(CooccurError::UnknownItemId(99))
        ));
    }

    /// T4.3: Snapshot bytes are stable across save -> load -> save.
    #[test]
    fn snapshot_is_stable() {
        let graph = CoOccurrenceGraph::restore(&fruit_rows()).expect("restore");
        let bytes = graph_to_bytes(&graph).expect("serialize");
        let again = graph_to_bytes(&graph_from_bytes(&bytes).expect("load")).expect("serialize");
        assert_eq!(bytes, again);
    }

    /// T4.4: The relational store survives a reopen.
    #[test]
    fn store_survives_reopen() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("fruit.redb");

        {
            let graph = CoOccurrenceGraph::restore(&fruit_rows()).expect("restore");
            RedbStore::open(&path).expect("open").save(&graph).expect("save");
        }

        let store = RedbStore::open(&path).expect("reopen");
        let graph = store.load().expect("load");
        assert_eq!(graph.items(), ["apple", "banana", "carrot"]);
        assert_eq!(graph.get_count("apple", "carrot"), 2);
        assert_eq!(store.pair_count().expect("pairs"), 2);
    }
}

// =============================================================================
// TIER T5: EMBEDDING AND RECOMMENDATION
// =============================================================================

mod t5_embedding {
    use super::*;
    use cooccur_core::{Query, QueryResult, Session, build_dense_matrix, compute_embeddings};
    use ndarray::Array2;

    fn two_clusters() -> CoOccurrenceGraph {
        let mut graph = CoOccurrenceGraph::new();
        for _ in 0..5 {
            graph.add_transaction(["a", "b", "c"]);
            graph.add_transaction(["x", "y", "z"]);
        }
        graph
    }

    /// T5.1: Non-square input is a structural error.
    #[test]
    fn non_square_rejected() {
        let result = compute_embeddings(&Array2::<f64>::zeros((2, 3)), 2);
        assert!(matches!(
            result,
            Err(CooccurError::NonSquareMatrix { rows: 2, cols: 3 })
        ));
    }

    /// T5.2: Rank is clamped to the catalog size.
    #[test]
    fn rank_is_clamped() {
        let dense = build_dense_matrix(&three_baskets());
        assert_eq!(compute_embeddings(&dense.values, 0).expect("embed").ncols(), 1);
        assert_eq!(compute_embeddings(&dense.values, 50).expect("embed").ncols(), 3);
    }

    /// T5.3: Recommendations stay inside the item's cluster first.
    #[test]
    fn same_cluster_ranks_first() {
        let mut session = Session::with_graph(two_clusters()).with_rank(6);
        let result = session
            .execute(&Query::recommend_item("a", 2))
            .expect("recommend");

        let QueryResult::Recommendations(recs) = result else {
            unreachable!("recommend_item answers with recommendations");
        };
        let mut names: Vec<&str> = recs.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["b", "c"]);
        assert!(recs.iter().all(|r| (r.similarity - 0.5).abs() < 1e-9));
    }

    /// T5.4: Basket and customer history rank identically.
    #[test]
    fn basket_equals_customer() {
        let mut session = Session::with_graph(two_clusters()).with_rank(6);
        let basket = vec!["a".to_string(), "unknown".to_string()];

        let by_basket = session
            .execute(&Query::RecommendBasket {
                items: basket.clone(),
                k: 4,
            })
            .expect("basket");
        let by_history = session
            .execute(&Query::RecommendCustomer {
                purchased: basket,
                k: 4,
            })
            .expect("customer");

        assert_eq!(by_basket, by_history);
        assert_eq!(session.model_builds(), 1);
    }
}
