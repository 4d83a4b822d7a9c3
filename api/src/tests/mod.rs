mod backend_routes_test;
