use crate::error::IndexError;
use crate::shard::Shard;
use crate::{DocumentIndex, InvertedIndex};

/// Global indexes produced from a complete set of shards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedIndex {
    pub inverted: InvertedIndex,
    pub documents: DocumentIndex,
}

impl MergedIndex {
    pub fn num_docs(&self) -> u32 {
        self.documents.len() as u32
    }
}

/// Union all shards into one index.
///
/// Document IDs must be globally unique; a repeated ID is reported as
/// `DuplicateDocument` instead of overwriting earlier postings. Shards are
/// merged in source order so the first reported collision is stable.
pub fn merge_shards(mut shards: Vec<Shard>) -> Result<MergedIndex, IndexError> {
    shards.sort_by(|a, b| a.source.cmp(&b.source));

    let mut merged = MergedIndex::default();
    for shard in shards {
        merged.documents.absorb(shard.documents)?;
        merged.inverted.absorb(shard.inverted)?;
    }
    tracing::info!(num_docs = merged.num_docs(), num_terms = merged.inverted.len(), "merged shards");
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::ShardBuilder;
    use crate::tokenizer::Normalizer;
    use std::sync::Arc;

    fn shard(name: &str, text: &str) -> Shard {
        ShardBuilder::new(Arc::new(Normalizer::default())).build_text(name.into(), text).unwrap()
    }

    fn shards() -> Vec<Shard> {
        vec![
            shard("a.sgm", r#"<REUTERS NEWID="1"><BODY>oil price oil</BODY></REUTERS>"#),
            shard("b.sgm", r#"<REUTERS NEWID="2"><BODY>gold price</BODY></REUTERS><REUTERS NEWID="4"><BODY>oil</BODY></REUTERS>"#),
            shard("c.sgm", r#"<REUTERS NEWID="3"><BODY>price of oil and gold</BODY></REUTERS>"#),
        ]
    }

    #[test]
    fn merge_is_order_independent() {
        let reference = merge_shards(shards()).unwrap();
        let permutations = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in permutations {
            let all = shards();
            let permuted: Vec<Shard> = order.iter().map(|&i| all[i].clone()).collect();
            assert_eq!(merge_shards(permuted).unwrap(), reference);
        }

        // Same result when merging pairwise and then merging the partial results.
        let mut left = MergedIndex::default();
        let mut right = MergedIndex::default();
        for (i, s) in shards().into_iter().enumerate() {
            let target = if i == 1 { &mut right } else { &mut left };
            target.documents.absorb(s.documents).unwrap();
            target.inverted.absorb(s.inverted).unwrap();
        }
        left.documents.absorb(right.documents).unwrap();
        left.inverted.absorb(right.inverted).unwrap();
        assert_eq!(left, reference);
    }

    #[test]
    fn merged_postings_union_documents() {
        let merged = merge_shards(shards()).unwrap();
        assert_eq!(merged.num_docs(), 4);
        let oil = merged.inverted.postings("oil").unwrap();
        assert_eq!(oil.keys().copied().collect::<Vec<_>>(), vec![1, 3, 4]);
        assert_eq!(oil[&1], vec![0, 2]);
    }

    #[test]
    fn duplicate_ids_across_shards_are_fatal() {
        let mut all = shards();
        all.push(shard("d.sgm", r#"<REUTERS NEWID="2"><BODY>silver</BODY></REUTERS>"#));
        let err = merge_shards(all).unwrap_err();
        assert!(matches!(err, IndexError::DuplicateDocument { doc_id: 2 }));
    }
}
