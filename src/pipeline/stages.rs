//! Static stage table.
//!
//! The pipeline is a fixed, ordered list of notebook stages. Each stage
//! declares the artifact it produces; everything inside the notebook is
//! opaque to the orchestrator.

use crate::models::StageDescriptor;

/// The full pipeline, in execution order.
pub fn stages() -> Vec<StageDescriptor> {
    vec![
        StageDescriptor::new(
            "Email Extraction",
            "notebooks/email_extraction.ipynb",
            "artifacts/placement_emails.csv",
            "Extract placement emails from the Gmail API",
        ),
        StageDescriptor::new(
            "Data Cleaning",
            "notebooks/data_cleaning.ipynb",
            "artifacts/ai_cleaned_emails.csv",
            "Clean email content with AI",
        ),
        StageDescriptor::new(
            "Data Filtering",
            "notebooks/data_filtering.ipynb",
            "artifacts/relevant_placement_emails.csv",
            "Filter relevant placement emails",
        ),
        StageDescriptor::new(
            "Entity Structuring",
            "notebooks/entity_structuring.ipynb",
            "artifacts/structured_job_postings.json",
            "Extract structured job information",
        ),
        StageDescriptor::new(
            "Job Prioritization",
            "notebooks/job_prioritization.ipynb",
            "artifacts/prioritized_jobs.json",
            "Rank and prioritize job opportunities",
        ),
        StageDescriptor::new(
            "PDF Management",
            "notebooks/pdf_management.ipynb",
            "artifacts/pdf_metadata.json",
            "Process and index PDF documents",
        ),
        StageDescriptor::new(
            "RAG System",
            "notebooks/rag_system.ipynb",
            "artifacts/vector_db",
            "Build vector database for Q&A",
        ),
        StageDescriptor::new(
            "Excel Reports",
            "notebooks/excel_reports.ipynb",
            "artifacts/excel_reports",
            "Generate formatted Excel reports",
        ),
    ]
}
