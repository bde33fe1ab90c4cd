mod encode_test;
mod extract_test;
mod parsing_test;
mod path_test;
mod reader_test;
mod value_test;
