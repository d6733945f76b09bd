//! # Adversarial Chains
//!
//! A peer hands over a snapshot it has tampered with. Whatever the defect,
//! the receiving tree must stay exactly as it was and the rejection kind
//! must reach the caller and the event log.

#[cfg(test)]
mod tests {
    use crate::support::{
        block_count, fast_config, foreign_config, mine_linear, node, node_pair, node_with_events,
        SteppingClock,
    };
    use pt_tree_consensus::ports::BlockTreeApi;
    use pt_tree_consensus::{
        Block, ChainRejection, ChainSource, PeerId, PeerTree, Post, ProofOfWork, RejectionKind,
        TreeEvent,
    };
    use std::sync::Arc;

    /// Child of `parent` that honestly links to it by hash and proof
    fn honest_child(parent: &Block, pow: &ProofOfWork, content: &str) -> Block {
        Block {
            depth: parent.depth + 1,
            timestamp: parent.timestamp + 1,
            post: Post::new(content),
            proof: pow.proof_of_work(&parent.proof),
            previous_hash: parent.hash(),
        }
    }

    // =========================================================================
    // TAMPERED CONTENT
    // =========================================================================

    #[tokio::test]
    async fn test_corrupted_interior_hash_rejects_whole_chain() {
        let (alice, bob) = node_pair();
        let leaf = mine_linear(&alice, &["one", "two", "three", "four"]).await;
        let mut view = alice.snapshot();

        // Break the link between "two" and "three" only
        let three = view.parent(leaf).unwrap();
        view.block_mut(three).unwrap().previous_hash = "0".repeat(64);

        let err = bob.submit_chain(&view, leaf, None).await.unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(ChainRejection::HashMismatch { depth: 3, .. })
        ));
        assert_eq!(block_count(&bob), 1);
    }

    #[tokio::test]
    async fn test_rewritten_post_is_detected() {
        let (alice, bob) = node_pair();
        let leaf = mine_linear(&alice, &["honest", "follow-up"]).await;
        let mut view = alice.snapshot();

        let first = view.parent(leaf).unwrap();
        view.block_mut(first).unwrap().post = Post::with_image("forged", "https://example.org/x.png");

        let err = bob.submit_chain(&view, leaf, None).await.unwrap_err();
        assert_eq!(
            err.rejection().map(ChainRejection::kind),
            Some(RejectionKind::HashMismatch)
        );
    }

    #[tokio::test]
    async fn test_tampered_leaf_post_is_accepted_as_new_block() {
        // The leaf has no descendants committing to it, so rewriting it
        // yields a different but valid block
        let (alice, bob) = node_pair();
        let leaf = mine_linear(&alice, &["original"]).await;
        let mut view = alice.snapshot();
        view.block_mut(leaf).unwrap().post.content = "edited".into();

        let outcome = bob.submit_chain(&view, leaf, None).await.unwrap();
        assert_eq!(outcome.attached.len(), 1);
        let merged = bob.get_block(outcome.attached[0]).await.unwrap();
        assert_eq!(merged.post.content, "edited");
    }

    // =========================================================================
    // BAD PROOFS AND DEPTHS
    // =========================================================================

    #[tokio::test]
    async fn test_unmined_block_rejected() {
        let (alice, bob) = node_pair();
        let mut view = alice.snapshot();
        let root = alice.tip().await;
        let root_block = view.block(root).unwrap().clone();

        let mut lazy = honest_child(&root_block, alice.pow(), "no work");
        // Any proof except the minimal one may still be valid; find one that is not
        lazy.proof = (0u64..)
            .map(|n| n.to_string())
            .find(|p| !alice.pow().valid_proof(&root_block.proof, p))
            .unwrap();
        let leaf = view.push(root, lazy).unwrap();

        let err = bob.submit_chain(&view, leaf, None).await.unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(ChainRejection::InvalidProof { depth: 1, .. })
        ));
        assert_eq!(block_count(&bob), 1);
    }

    #[tokio::test]
    async fn test_wrong_depth_rejected() {
        let (alice, bob) = node_pair();
        let mut view = alice.snapshot();
        let root = alice.tip().await;
        let root_block = view.block(root).unwrap().clone();

        let mut skipped = honest_child(&root_block, alice.pow(), "skips ahead");
        skipped.depth = 5;
        let leaf = view.push(root, skipped).unwrap();

        let err = bob.submit_chain(&view, leaf, None).await.unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&ChainRejection::DepthMismatch {
                expected: 1,
                actual: 5
            })
        );
    }

    #[tokio::test]
    async fn test_hand_built_chain_accepted() {
        let (alice, bob) = node_pair();
        let root = alice.with_tree(|tree| tree.root().clone());

        let first = honest_child(&root, alice.pow(), "built by hand");
        let second = honest_child(&first, alice.pow(), "and another");
        let (view, leaf) = PeerTree::from_chain([root, first, second]).unwrap();

        let outcome = bob.submit_chain(&view, leaf, None).await.unwrap();
        assert_eq!(outcome.attached.len(), 2);
    }

    // =========================================================================
    // FOREIGN AND DEGENERATE CHAINS
    // =========================================================================

    #[tokio::test]
    async fn test_foreign_root_rejected_and_tree_unchanged() {
        let clock = Arc::new(SteppingClock::new());
        let (home, events) = node_with_events(fast_config(), Arc::clone(&clock));
        let stranger = node(foreign_config(), clock);
        mine_linear(&home, &["local"]).await;
        let leaf = mine_linear(&stranger, &["elsewhere", "still elsewhere"]).await;
        let before = home.with_tree(|tree| tree.clone());

        let err = home
            .submit_chain(&stranger.snapshot(), leaf, Some(PeerId::new("stranger")))
            .await
            .unwrap_err();

        match err.rejection() {
            Some(ChainRejection::ForeignRoot { expected, actual }) => {
                assert_eq!(expected, &home.root_hash());
                assert_eq!(actual, &stranger.root_hash());
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
        home.with_tree(|tree| {
            assert_eq!(tree.len(), before.len());
            assert_eq!(tree.tip(), before.tip());
        });

        let last = events.events().pop().unwrap();
        let TreeEvent::ChainRejected(rejected) = &last else {
            panic!("unexpected event: {last:?}");
        };
        assert_eq!(rejected.kind, RejectionKind::ForeignRoot);
        assert_eq!(rejected.peer, Some(PeerId::new("stranger")));
    }

    #[tokio::test]
    async fn test_root_only_chain_is_empty() {
        let (alice, bob) = node_pair();
        let root = alice.tip().await;

        let err = bob
            .submit_chain(&alice.snapshot(), root, None)
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(&ChainRejection::EmptyChain));
        assert!(!err.rejection().unwrap().is_peer_fault());
    }

    #[tokio::test]
    async fn test_unknown_leaf_is_empty() {
        let (alice, bob) = node_pair();
        let leaf = mine_linear(&alice, &["one"]).await;
        let view = PeerTree::from_chain([alice.with_tree(|tree| tree.root().clone())])
            .unwrap()
            .0;

        let err = bob.submit_chain(&view, leaf, None).await.unwrap_err();
        assert_eq!(err.rejection(), Some(&ChainRejection::EmptyChain));
    }

    #[tokio::test]
    async fn test_rejection_does_not_block_later_merge() {
        let (alice, bob) = node_pair();
        let leaf = mine_linear(&alice, &["one", "two"]).await;

        let mut forged = alice.snapshot();
        let parent_proof = forged.block(forged.parent(leaf).unwrap()).unwrap().proof.clone();
        forged.block_mut(leaf).unwrap().proof = (0u64..)
            .map(|n| n.to_string())
            .find(|p| !alice.pow().valid_proof(&parent_proof, p))
            .unwrap();
        assert!(bob.submit_chain(&forged, leaf, None).await.is_err());

        let outcome = bob
            .submit_chain(&alice.snapshot(), leaf, None)
            .await
            .unwrap();
        assert_eq!(outcome.attached.len(), 2);
    }
}
