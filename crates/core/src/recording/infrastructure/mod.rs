pub mod threaded_recorder;
