// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw interaction CSV to padded tensor
// batches.
//
//   interaction CSV
//       │
//       ▼
//   CsvTable            → header-addressed rows
//       │
//       ▼
//   SequenceExtractor   → one StudentSequence per student
//       │
//       ▼
//   KtDataset           → implements Burn's Dataset trait
//       │
//       ▼
//   split_train_val_test → three disjoint index sets (KtSubset)
//       │
//       ▼
//   KtBatcher           → pads each batch with -1
//       │
//       ▼
//   DataLoader          → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads CSV files into column-addressed tables
pub mod loader;

/// Groups interactions into per-student sequences
pub mod extractor;

/// Implements Burn's Dataset trait for student sequences
pub mod dataset;

/// Implements Burn's Batcher trait with sentinel padding
pub mod batcher;

/// Random train/validation/test split over student indices
pub mod splitter;
