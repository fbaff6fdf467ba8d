use serde::Serialize;

use crate::catalog::Catalog;
use crate::domain::program::ProgramId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProgramDocuments {
    pub program_id: ProgramId,
    pub program_name: &'static str,
    pub required_documents: Vec<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentChecklist {
    pub programs_checked: usize,
    pub documents_by_program: Vec<ProgramDocuments>,
    pub unique_documents_needed: Vec<&'static str>,
    pub total_unique_documents: usize,
}

/// Resolves the document checklist for a program set. Lists are static
/// per-program configuration; the deduplicated view keeps first-seen
/// order so the checklist reads in the same order as the programs.
pub fn checklist(
    catalog: &Catalog,
    program_ids: &[ProgramId],
) -> Result<DocumentChecklist, DomainError> {
    let programs = catalog.resolve(program_ids)?;

    let documents_by_program: Vec<ProgramDocuments> = programs
        .into_iter()
        .map(|program| ProgramDocuments {
            program_id: program.id.clone(),
            program_name: program.name,
            required_documents: program.required_documents.to_vec(),
        })
        .collect();

    let mut unique_documents_needed: Vec<&'static str> = Vec::new();
    for entry in &documents_by_program {
        for document in &entry.required_documents {
            if !unique_documents_needed.contains(document) {
                unique_documents_needed.push(document);
            }
        }
    }

    Ok(DocumentChecklist {
        programs_checked: documents_by_program.len(),
        total_unique_documents: unique_documents_needed.len(),
        documents_by_program,
        unique_documents_needed,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::checklist;
    use crate::catalog::standard_catalog;
    use crate::domain::program::ProgramId;
    use crate::errors::DomainError;

    fn ids(raw: &[&str]) -> Vec<ProgramId> {
        raw.iter().map(|id| ProgramId::new(*id)).collect()
    }

    #[test]
    fn snap_and_wic_share_common_documents() {
        let catalog = standard_catalog();
        let result = checklist(&catalog, &ids(&["snap", "wic"])).expect("checklist");

        assert_eq!(result.programs_checked, 2);
        // 4 + 4 documents; Photo ID and Proof of address are shared.
        assert_eq!(result.total_unique_documents, 6);
        assert!(result.unique_documents_needed.contains(&"Photo ID"));
        assert!(result.unique_documents_needed.contains(&"Child birth certificates"));
    }

    #[test]
    fn unique_documents_are_a_set_union_of_per_program_lists() {
        let catalog = standard_catalog();
        let result =
            checklist(&catalog, &ids(&["snap", "medicaid", "section8", "tafdc"]))
                .expect("checklist");

        let union: HashSet<&str> = result
            .documents_by_program
            .iter()
            .flat_map(|entry| entry.required_documents.iter().copied())
            .collect();
        let unique: HashSet<&str> = result.unique_documents_needed.iter().copied().collect();

        assert_eq!(unique, union);
        assert_eq!(result.unique_documents_needed.len(), unique.len(), "no duplicates");
        let list_total: usize =
            result.documents_by_program.iter().map(|entry| entry.required_documents.len()).sum();
        assert!(result.total_unique_documents <= list_total);
    }

    #[test]
    fn unknown_program_id_is_rejected() {
        let catalog = standard_catalog();
        let result = checklist(&catalog, &ids(&["snap", "bogus"]));
        assert!(matches!(result, Err(DomainError::ProgramNotFound(_))));
    }
}
