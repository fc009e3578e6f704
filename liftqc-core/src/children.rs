//! Gene classification by child signature
//!
//! A gene's signature is the colon-joined list of the distinct feature
//! types among its descendants, in the order the store yields them. Genes
//! sharing a signature are grouped together; a gene without children gets
//! the empty signature.

use crate::store::FeatureStore;
use crate::types::GENE_TYPE;
use indexmap::{IndexMap, IndexSet};

/// Signatures reported when no allow-list is given.
pub const DEFAULT_WANTED_SIGNATURES: [&str; 2] = ["CDS:exon:mRNA:transcript", "exon:transcript"];

pub const SIGNATURE_SEPARATOR: &str = ":";

/// Signature → gene ids, both in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildSignatures {
    groups: IndexMap<String, IndexSet<String>>,
}

impl ChildSignatures {
    pub fn insert(&mut self, signature: String, gene_id: String) {
        self.groups.entry(signature).or_default().insert(gene_id);
    }

    pub fn get(&self, signature: &str) -> Option<&IndexSet<String>> {
        self.groups.get(signature)
    }

    pub fn signatures(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// (signature, number of genes) for every signature found.
    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.iter().map(|(sig, genes)| (sig, genes.len())).collect()
    }

    /// Rows for the requested signatures, in request order. Signatures that
    /// were never seen contribute nothing.
    pub fn select<'a, S: AsRef<str>>(&'a self, wanted: &'a [S]) -> Vec<(&'a str, &'a str)> {
        wanted
            .iter()
            .filter_map(|sig| self.groups.get_key_value(sig.as_ref()))
            .flat_map(|(sig, genes)| genes.iter().map(move |g| (sig.as_str(), g.as_str())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Distinct types among `children`, first-seen order, joined with `:`.
pub fn child_signature<'a, I>(children_types: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: IndexSet<&str> = children_types.into_iter().collect();
    distinct.into_iter().collect::<Vec<_>>().join(SIGNATURE_SEPARATOR)
}

/// Group every `gene` feature of the store by its child signature.
pub fn classify_genes<S: FeatureStore + ?Sized>(store: &S) -> ChildSignatures {
    let mut signatures = ChildSignatures::default();

    for gene in store.features_of_type(GENE_TYPE) {
        let children = store.children(gene);
        let signature = child_signature(children.iter().map(|c| c.feature_type.as_str()));
        signatures.insert(signature, gene.id.clone());
    }

    log::debug!("Classified genes into {} child signatures", signatures.len());
    signatures
}
