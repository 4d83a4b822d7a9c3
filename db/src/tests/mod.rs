mod message_store_tests;
