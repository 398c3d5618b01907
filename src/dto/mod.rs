pub mod authoring_dto;
